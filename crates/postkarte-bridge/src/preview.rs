// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recording bridge for previewing what a send would launch.
//
// Nothing is shown to a user: launched intents are kept in memory so a
// desktop tool (or a test) can inspect them and then deliver the completion
// by hand through `EmailSender::on_activity_result`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;

use postkarte_core::error::{PostkarteError, Result};
use postkarte_core::types::{CorrelationToken, ShareIntent, ShareableRef};

use crate::host::HostSlot;
use crate::traits::*;

/// Package name the preview bridge pretends to run as.
pub const PREVIEW_PACKAGE: &str = "postkarte.preview";

/// One launch the preview bridge accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRecord {
    pub intent: ShareIntent,
    pub token: CorrelationToken,
}

/// In-memory bridge with a configurable number of installed mail apps.
pub struct PreviewBridge {
    host: HostSlot<&'static str>,
    mail_apps: usize,
    authority: String,
    fail_launch: bool,
    launched: Mutex<Vec<LaunchRecord>>,
}

impl PreviewBridge {
    /// A foreground context with one mail app installed.
    pub fn new() -> Self {
        let host = HostSlot::new();
        host.attach(PREVIEW_PACKAGE);
        Self {
            host,
            mail_apps: 1,
            authority: format!("{PREVIEW_PACKAGE}.file_provider"),
            fail_launch: false,
            launched: Mutex::new(Vec::new()),
        }
    }

    pub fn with_mail_apps(mut self, count: usize) -> Self {
        self.mail_apps = count;
        self
    }

    pub fn without_context(self) -> Self {
        self.detach_host();
        self
    }

    /// Simulate the host activity coming back.
    pub fn attach_host(&self) {
        self.host.attach(PREVIEW_PACKAGE);
    }

    /// Simulate the host activity going away.
    pub fn detach_host(&self) {
        self.host.detach();
    }

    /// Make every launch fail as if the platform threw.
    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    fn records(&self) -> MutexGuard<'_, Vec<LaunchRecord>> {
        self.launched.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every launch so far, oldest first.
    pub fn launched(&self) -> Vec<LaunchRecord> {
        self.records().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.records().len()
    }
}

impl Default for PreviewBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for PreviewBridge {
    fn platform_name(&self) -> &str {
        "Preview"
    }
}

impl AttachmentResolver for PreviewBridge {
    fn resolve(&self, path: &Path) -> Result<ShareableRef> {
        // Same shape as a FileProvider `root-path` URI.
        Ok(ShareableRef::new(format!(
            "content://{}/root{}",
            self.authority,
            path.display()
        )))
    }
}

impl NativeComposer for PreviewBridge {
    fn has_context(&self) -> bool {
        self.host.is_attached()
    }

    fn can_handle(&self, _intent: &ShareIntent) -> Result<bool> {
        Ok(self.mail_apps > 0)
    }

    fn launch(&self, intent: &ShareIntent, token: CorrelationToken) -> Result<()> {
        if self.fail_launch {
            return Err(PostkarteError::Bridge("preview launch failure".into()));
        }
        info!(
            action = intent.action.intent_action(),
            attachments = intent.streams.len(),
            %token,
            "preview: launch recorded"
        );
        self.records().push(LaunchRecord {
            intent: intent.clone(),
            token,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postkarte_core::types::ShareAction;

    fn intent() -> ShareIntent {
        ShareIntent {
            action: ShareAction::Send,
            mime_type: "*/*".into(),
            subject: None,
            text: None,
            email: None,
            cc: None,
            bcc: None,
            streams: Vec::new(),
            grant_read_permission: false,
        }
    }

    #[test]
    fn resolves_like_a_file_provider() {
        let bridge = PreviewBridge::new();
        let r = bridge.resolve(Path::new("/tmp/a.pdf")).expect("resolve");
        assert_eq!(r.uri, "content://postkarte.preview.file_provider/root/tmp/a.pdf");
    }

    #[test]
    fn context_follows_host_attachment() {
        let bridge = PreviewBridge::new();
        assert!(bridge.has_context());
        bridge.detach_host();
        assert!(!bridge.has_context());
        bridge.attach_host();
        assert!(bridge.has_context());
        assert!(!PreviewBridge::new().without_context().has_context());
    }

    #[test]
    fn no_mail_apps_cannot_handle() {
        let bridge = PreviewBridge::new().with_mail_apps(0);
        assert!(!bridge.can_handle(&intent()).expect("can_handle"));
    }

    #[test]
    fn records_launches() {
        let bridge = PreviewBridge::new();
        bridge.launch(&intent(), CorrelationToken(1)).expect("launch");
        assert_eq!(bridge.launch_count(), 1);
        assert_eq!(bridge.launched()[0].token, CorrelationToken(1));
    }
}
