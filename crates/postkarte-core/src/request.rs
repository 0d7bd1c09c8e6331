// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Translation of the caller's named-argument bag into a typed send request.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{PostkarteError, Result};
use crate::types::MethodCall;

pub const ARG_SUBJECT: &str = "subject";
pub const ARG_BODY: &str = "body";
pub const ARG_RECIPIENTS: &str = "recipients";
pub const ARG_CC: &str = "cc";
pub const ARG_BCC: &str = "bcc";
pub const ARG_ATTACHMENT_PATH: &str = "attachment_path";
pub const ARG_ATTACHMENT_PATHS: &str = "attachment_paths";

/// Attachments of a send request. The two caller forms are exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Attachments {
    /// No attachment argument supplied.
    #[default]
    None,
    /// `attachment_path` was supplied. `None` when its value was `null`.
    Single(Option<PathBuf>),
    /// `attachment_paths` was supplied. `None` when its value was `null`.
    Multiple(Option<Vec<PathBuf>>),
}

impl Attachments {
    /// Whether the multiple-items share mode applies.
    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }

    /// All concrete paths, in caller order.
    pub fn paths(&self) -> Vec<&PathBuf> {
        match self {
            Self::None | Self::Single(None) | Self::Multiple(None) => Vec::new(),
            Self::Single(Some(path)) => vec![path],
            Self::Multiple(Some(paths)) => paths.iter().collect(),
        }
    }

    /// Whether any attachment value (possibly an empty list) was supplied.
    pub fn has_value(&self) -> bool {
        matches!(self, Self::Single(Some(_)) | Self::Multiple(Some(_)))
    }
}

/// A request to compose an email. Transient: built when `send` arrives and
/// dropped once the native action has been dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendRequest {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub recipients: Option<Vec<String>>,
    pub cc: Option<Vec<String>>,
    pub bcc: Option<Vec<String>>,
    pub attachments: Attachments,
}

impl SendRequest {
    /// Parse the named arguments of a `send` call.
    ///
    /// Fails with [`PostkarteError::InvalidArguments`] if both attachment
    /// forms are present (checked first), or if any value has the wrong type.
    /// Absent keys and `null` values leave the field unset.
    pub fn from_call(call: &MethodCall) -> Result<Self> {
        let has_single = call.has_argument(ARG_ATTACHMENT_PATH);
        let has_multiple = call.has_argument(ARG_ATTACHMENT_PATHS);
        if has_single && has_multiple {
            return Err(PostkarteError::InvalidArguments(format!(
                "{ARG_ATTACHMENT_PATH} and {ARG_ATTACHMENT_PATHS} cannot both be present"
            )));
        }

        let args = &call.arguments;
        let attachments = if has_multiple {
            Attachments::Multiple(optional::<Vec<PathBuf>>(args, ARG_ATTACHMENT_PATHS)?)
        } else if has_single {
            Attachments::Single(optional::<PathBuf>(args, ARG_ATTACHMENT_PATH)?)
        } else {
            Attachments::None
        };

        Ok(Self {
            subject: optional(args, ARG_SUBJECT)?,
            body: optional(args, ARG_BODY)?,
            recipients: optional(args, ARG_RECIPIENTS)?,
            cc: optional(args, ARG_CC)?,
            bcc: optional(args, ARG_BCC)?,
            attachments,
        })
    }
}

/// Read an optional typed argument. `null` and absence both yield `None`.
fn optional<T: DeserializeOwned>(args: &Map<String, Value>, key: &str) -> Result<Option<T>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| PostkarteError::InvalidArguments(format!("{key}: {e}"))),
    }
}
