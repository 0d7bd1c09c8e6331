// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Postkarte email bridge.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Name of the only method the bridge implements.
pub const METHOD_SEND: &str = "send";

/// Opaque value matching an asynchronous completion back to its dispatch.
///
/// On Android this is the `startActivityForResult` request code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationToken(pub i32);

impl std::fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one send session, used for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a correlation token is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Nothing dispatched, or the last dispatch has been reported.
    Idle,
    /// A native mail app was launched and has not returned yet.
    AwaitingResult,
}

/// Native share action mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareAction {
    /// A single item (`ACTION_SEND`).
    Send,
    /// Several items (`ACTION_SEND_MULTIPLE`).
    SendMultiple,
}

impl ShareAction {
    /// The Android intent action string.
    pub fn intent_action(self) -> &'static str {
        match self {
            Self::Send => "android.intent.action.SEND",
            Self::SendMultiple => "android.intent.action.SEND_MULTIPLE",
        }
    }
}

/// A permission-scoped handle to a file the receiving app may read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareableRef {
    /// Content URI (`content://...` on Android, `file://...` elsewhere).
    pub uri: String,
}

impl ShareableRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// Platform-neutral description of the native "compose/send" action.
///
/// Every optional field is `None` unless the caller supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareIntent {
    pub action: ShareAction,
    pub mime_type: String,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub email: Option<Vec<String>>,
    pub cc: Option<Vec<String>>,
    pub bcc: Option<Vec<String>>,
    /// Resolved attachment references, in caller order.
    pub streams: Vec<ShareableRef>,
    /// Grant the receiving app temporary read access to `streams`.
    pub grant_read_permission: bool,
}

/// A method invocation from the cross-platform application layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Whether the named argument was supplied at all (even as `null`).
    pub fn has_argument(&self, key: &str) -> bool {
        self.arguments.contains_key(key)
    }
}

/// The single reply delivered for a method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MethodResponse {
    Success(Option<Value>),
    Error { code: String, message: String },
    NotImplemented,
}

impl MethodResponse {
    pub fn error(err: &crate::PostkarteError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The error code, if this is an error reply.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Error { code, .. } => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PostkarteError;
    use serde_json::json;

    #[test]
    fn has_argument_counts_null_as_present() {
        let Value::Object(args) = json!({ "subject": null }) else {
            unreachable!()
        };
        let call = MethodCall::new(METHOD_SEND, args);
        assert!(call.has_argument("subject"));
        assert!(!call.has_argument("body"));
    }

    #[test]
    fn method_call_deserializes_without_arguments() {
        let call: MethodCall = serde_json::from_str(r#"{"method":"send"}"#).expect("deserialize");
        assert_eq!(call.method, "send");
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn error_response_carries_code_and_message() {
        let resp = MethodResponse::error(&PostkarteError::NotAvailable);
        assert_eq!(resp.error_code(), Some("not_available"));
        assert!(!resp.is_success());
    }

    #[test]
    fn intent_actions() {
        assert_eq!(ShareAction::Send.intent_action(), "android.intent.action.SEND");
        assert_eq!(
            ShareAction::SendMultiple.intent_action(),
            "android.intent.action.SEND_MULTIPLE"
        );
    }
}
