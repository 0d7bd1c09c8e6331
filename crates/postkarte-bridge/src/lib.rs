// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Postkarte — native email composition bridge.
//!
//! The application layer invokes `send` with a bag of named arguments. The
//! bridge validates them, builds a native share action, launches whichever
//! installed mail app can handle it, and reports back once that app returns
//! control. Nothing is sent over the network here.
//!
//! Platform specifics sit behind the traits in [`traits`]; the request
//! sequencing in [`sender`] is identical on every platform.

pub mod host;
pub mod preview;
pub mod responder;
pub mod sender;
pub mod session;
pub mod traits;
pub mod translate;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

pub use host::HostSlot;
pub use responder::Responder;
pub use sender::EmailSender;
pub use session::{SessionHandle, SessionRegistry};

use postkarte_core::BridgeConfig;

/// Retrieves the bridge implementation for the target operating system.
pub fn platform_bridge(config: &BridgeConfig) -> Box<dyn traits::PlatformBridge> {
    #[cfg(target_os = "android")]
    {
        // Android: Intent + FileProvider through `jni-rs`.
        Box::new(android::AndroidBridge::new(config))
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: no activity to launch from.
        let _ = config;
        Box::new(stub::StubBridge)
    }
}
