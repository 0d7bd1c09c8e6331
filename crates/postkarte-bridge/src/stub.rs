// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where there is no activity to launch a
// mail app from. `send` always ends with the "error" code.

use std::path::Path;

use postkarte_core::error::{PostkarteError, Result};
use postkarte_core::types::{CorrelationToken, ShareIntent, ShareableRef};

use crate::traits::*;

/// No-op bridge returned on non-Android platforms.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl AttachmentResolver for StubBridge {
    fn resolve(&self, path: &Path) -> Result<ShareableRef> {
        Ok(ShareableRef::new(format!("file://{}", path.display())))
    }
}

impl NativeComposer for StubBridge {
    fn has_context(&self) -> bool {
        tracing::warn!("NativeComposer::has_context called on stub bridge");
        false
    }

    fn can_handle(&self, _intent: &ShareIntent) -> Result<bool> {
        Err(PostkarteError::PlatformUnavailable)
    }

    fn launch(&self, _intent: &ShareIntent, _token: CorrelationToken) -> Result<()> {
        tracing::warn!("NativeComposer::launch called on stub bridge");
        Err(PostkarteError::PlatformUnavailable)
    }
}
