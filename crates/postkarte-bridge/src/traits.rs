// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native capabilities the email
// bridge needs.

use std::path::Path;

use postkarte_core::error::Result;
use postkarte_core::types::{CorrelationToken, ShareIntent, ShareableRef};

/// Unified bridge that groups the native capabilities.
///
/// Implementations are shared between the call-delivery and the
/// result-delivery paths, hence `Send + Sync`.
pub trait PlatformBridge: AttachmentResolver + NativeComposer + Send + Sync {
    /// Human-readable platform name (e.g. "Android").
    fn platform_name(&self) -> &str;
}

/// Turn a local file path into a reference the receiving app may read.
pub trait AttachmentResolver {
    /// Resolve `path` to a shareable reference scoped to this application.
    ///
    /// The path is not checked for existence.
    fn resolve(&self, path: &Path) -> Result<ShareableRef>;
}

/// Launch the native compose/share action.
pub trait NativeComposer {
    /// Whether there is an application context (foreground activity) to
    /// launch from.
    fn has_context(&self) -> bool;

    /// Whether at least one installed app can handle `intent`.
    fn can_handle(&self, intent: &ShareIntent) -> Result<bool>;

    /// Launch `intent`. The platform reports the app's return later, tagged
    /// with `token`.
    fn launch(&self, intent: &ShareIntent, token: CorrelationToken) -> Result<()>;
}
