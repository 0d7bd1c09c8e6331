// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SendRequest -> ShareIntent.

use tracing::debug;

use postkarte_core::config::BridgeConfig;
use postkarte_core::error::{PostkarteError, Result};
use postkarte_core::request::SendRequest;
use postkarte_core::types::{ShareAction, ShareIntent};

use crate::traits::AttachmentResolver;

/// Build the native share action for `request`.
///
/// Only fields the caller supplied are set. Each attachment path is resolved
/// through `resolver`; a resolver failure aborts the whole request.
pub fn build_intent<R>(
    request: &SendRequest,
    resolver: &R,
    config: &BridgeConfig,
) -> Result<ShareIntent>
where
    R: AttachmentResolver + ?Sized,
{
    let action = if request.attachments.is_multiple() {
        ShareAction::SendMultiple
    } else {
        ShareAction::Send
    };

    let streams = request
        .attachments
        .paths()
        .into_iter()
        .map(|path| {
            resolver.resolve(path).map_err(|e| {
                if matches!(e, PostkarteError::Attachment(_)) {
                    e
                } else {
                    PostkarteError::Attachment(format!("{}: {e}", path.display()))
                }
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(?action, attachments = streams.len(), "share intent built");

    Ok(ShareIntent {
        action,
        mime_type: config.mime_type.clone(),
        subject: request.subject.clone(),
        text: request.body.clone(),
        email: request.recipients.clone(),
        cc: request.cc.clone(),
        bcc: request.bcc.clone(),
        streams,
        grant_read_permission: request.attachments.has_value(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use postkarte_core::request::Attachments;
    use postkarte_core::types::ShareableRef;

    #[derive(Default)]
    struct RecordingResolver {
        seen: Mutex<Vec<PathBuf>>,
        reject: Option<PathBuf>,
    }

    impl AttachmentResolver for RecordingResolver {
        fn resolve(&self, path: &Path) -> Result<ShareableRef> {
            if self.reject.as_deref() == Some(path) {
                return Err(PostkarteError::Bridge("outside provider roots".into()));
            }
            self.seen.lock().expect("resolver lock").push(path.to_path_buf());
            Ok(ShareableRef::new(format!("content://test{}", path.display())))
        }
    }

    #[test]
    fn empty_request_sets_nothing() {
        let resolver = RecordingResolver::default();
        let intent =
            build_intent(&SendRequest::default(), &resolver, &BridgeConfig::default()).expect("build intent");

        assert_eq!(intent.action, ShareAction::Send);
        assert_eq!(intent.mime_type, "*/*");
        assert!(intent.subject.is_none());
        assert!(intent.text.is_none());
        assert!(intent.email.is_none());
        assert!(intent.cc.is_none());
        assert!(intent.bcc.is_none());
        assert!(intent.streams.is_empty());
        assert!(!intent.grant_read_permission);
    }

    #[test]
    fn copies_supplied_fields() {
        let request = SendRequest {
            subject: Some("Hi".into()),
            body: Some("Hello".into()),
            recipients: Some(vec!["a@x.com".into()]),
            bcc: Some(vec!["b@x.com".into()]),
            ..Default::default()
        };
        let intent =
            build_intent(&request, &RecordingResolver::default(), &BridgeConfig::default())
                .expect("build intent");

        assert_eq!(intent.subject.as_deref(), Some("Hi"));
        assert_eq!(intent.text.as_deref(), Some("Hello"));
        assert_eq!(intent.email, Some(vec!["a@x.com".to_string()]));
        assert!(intent.cc.is_none());
        assert_eq!(intent.bcc, Some(vec!["b@x.com".to_string()]));
    }

    #[test]
    fn multiple_paths_resolve_in_order() {
        let resolver = RecordingResolver::default();
        let request = SendRequest {
            attachments: Attachments::Multiple(Some(vec![
                "/tmp/a.pdf".into(),
                "/tmp/b.pdf".into(),
            ])),
            ..Default::default()
        };
        let intent = build_intent(&request, &resolver, &BridgeConfig::default()).expect("build intent");

        assert_eq!(intent.action, ShareAction::SendMultiple);
        assert!(intent.grant_read_permission);
        assert_eq!(
            intent.streams,
            vec![
                ShareableRef::new("content://test/tmp/a.pdf"),
                ShareableRef::new("content://test/tmp/b.pdf"),
            ]
        );
        assert_eq!(resolver.seen.lock().expect("resolver lock").len(), 2);
    }

    #[test]
    fn null_single_path_neither_resolves_nor_grants() {
        let resolver = RecordingResolver::default();
        let request = SendRequest {
            attachments: Attachments::Single(None),
            ..Default::default()
        };
        let intent = build_intent(&request, &resolver, &BridgeConfig::default()).expect("build intent");
        assert_eq!(intent.action, ShareAction::Send);
        assert!(!intent.grant_read_permission);
        assert!(resolver.seen.lock().expect("resolver lock").is_empty());
    }

    #[test]
    fn resolver_failure_is_attachment_error() {
        let resolver = RecordingResolver {
            reject: Some("/etc/shadow".into()),
            ..Default::default()
        };
        let request = SendRequest {
            attachments: Attachments::Single(Some("/etc/shadow".into())),
            ..Default::default()
        };
        let err = build_intent(&request, &resolver, &BridgeConfig::default()).expect_err("build should fail");
        assert!(matches!(err, PostkarteError::Attachment(_)));
        assert_eq!(err.code(), "error");
        assert!(err.to_string().contains("/etc/shadow"));
    }

    #[test]
    fn mime_type_comes_from_config() {
        let config = BridgeConfig {
            mime_type: "message/rfc822".into(),
            ..Default::default()
        };
        let intent =
            build_intent(&SendRequest::default(), &RecordingResolver::default(), &config).expect("build intent");
        assert_eq!(intent.mime_type, "message/rfc822");
    }
}
