// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::CorrelationToken;

/// Settings for the email bridge. Missing fields in a config file take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Method channel the host plugin registers the handler under.
    pub channel_name: String,
    /// Request code used to correlate the native app's return (default 607).
    pub request_code: i32,
    /// MIME type set on the share action.
    pub mime_type: String,
    /// Appended to the application package name to form the file provider
    /// authority.
    pub file_provider_suffix: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channel_name: "postkarte/email_sender".into(),
            request_code: 607,
            mime_type: "*/*".into(),
            file_provider_suffix: ".file_provider".into(),
        }
    }
}

impl BridgeConfig {
    /// Load a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }

    /// The token every send dispatch is correlated under.
    pub fn correlation_token(&self) -> CorrelationToken {
        CorrelationToken(self.request_code)
    }

    /// File provider authority for the given application package.
    pub fn file_provider_authority(&self, package_name: &str) -> String {
        format!("{package_name}{}", self.file_provider_suffix)
    }
}
