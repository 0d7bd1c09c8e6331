// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Postkarte.

use thiserror::Error;

/// Wire code: malformed or conflicting arguments.
pub const CODE_INVALID_ARGUMENTS: &str = "invalid_arguments";
/// Wire code: generic failure (no application context, bridge failure).
pub const CODE_ERROR: &str = "error";
/// Wire code: no installed application can compose the email.
pub const CODE_NOT_AVAILABLE: &str = "not_available";
/// Wire code: a send request is already awaiting its result.
pub const CODE_BUSY: &str = "busy";

/// Top-level error type for all Postkarte operations.
#[derive(Debug, Error)]
pub enum PostkarteError {
    // -- Request errors --
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    // -- Dispatch errors --
    #[error("no application context available to dispatch from")]
    NoContext,

    #[error("no email clients found")]
    NotAvailable,

    #[error("a send request is already awaiting its result")]
    Busy,

    #[error("attachment could not be shared: {0}")]
    Attachment(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

impl PostkarteError {
    /// The error code reported back to the calling application layer.
    ///
    /// Only argument conflicts, missing capability and re-entry get their own
    /// code; everything else collapses into the generic `"error"`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArguments(_) => CODE_INVALID_ARGUMENTS,
            Self::NotAvailable => CODE_NOT_AVAILABLE,
            Self::Busy => CODE_BUSY,
            Self::NoContext
            | Self::Attachment(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Bridge(_)
            | Self::PlatformUnavailable => CODE_ERROR,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PostkarteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_wire_names() {
        assert_eq!(
            PostkarteError::InvalidArguments("x".into()).code(),
            "invalid_arguments"
        );
        assert_eq!(PostkarteError::NotAvailable.code(), "not_available");
        assert_eq!(PostkarteError::Busy.code(), "busy");
        assert_eq!(PostkarteError::NoContext.code(), "error");
        assert_eq!(PostkarteError::Bridge("jni".into()).code(), "error");
        assert_eq!(PostkarteError::Attachment("gone".into()).code(), "error");
    }

    #[test]
    fn not_available_message_is_user_readable() {
        assert_eq!(PostkarteError::NotAvailable.to_string(), "no email clients found");
    }
}
