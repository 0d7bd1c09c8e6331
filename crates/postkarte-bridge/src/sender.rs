// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Method-call handler for the email bridge.
//
// A `send` call is answered in one of two ways:
//   * synchronously with an error, when the arguments conflict, there is no
//     activity, no mail app is installed, or a previous send is still open;
//   * asynchronously with an empty success, once the launched mail app hands
//     control back (`on_activity_result`).
//
// The mail app's own result code is ignored: sent, discarded and
// backgrounded all report the same success. There is no failure path after a
// successful launch, and no timeout if the app never returns.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use postkarte_core::config::BridgeConfig;
use postkarte_core::error::{PostkarteError, Result};
use postkarte_core::request::SendRequest;
use postkarte_core::types::{CorrelationToken, METHOD_SEND, MethodCall, SessionState, ShareIntent};

use crate::responder::Responder;
use crate::session::SessionRegistry;
use crate::traits::PlatformBridge;
use crate::translate::build_intent;

/// Handles `send` calls and the platform's activity-result notifications.
pub struct EmailSender {
    bridge: Arc<dyn PlatformBridge>,
    config: BridgeConfig,
    sessions: SessionRegistry,
}

impl EmailSender {
    pub fn new(bridge: Arc<dyn PlatformBridge>, config: BridgeConfig) -> Self {
        info!(
            platform = bridge.platform_name(),
            channel = %config.channel_name,
            request_code = config.request_code,
            "email sender ready"
        );
        Self {
            bridge,
            config,
            sessions: SessionRegistry::new(),
        }
    }

    /// Sender for the current OS, see [`crate::platform_bridge`].
    pub fn for_platform(config: BridgeConfig) -> Self {
        let bridge = Arc::from(crate::platform_bridge(&config));
        Self::new(bridge, config)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn platform_name(&self) -> &str {
        self.bridge.platform_name()
    }

    /// Whether a launched mail app is still outstanding.
    pub fn state(&self) -> SessionState {
        self.sessions.state(self.token())
    }

    fn token(&self) -> CorrelationToken {
        self.config.correlation_token()
    }

    /// Entry point for calls from the application layer.
    #[instrument(skip_all, fields(method = %call.method))]
    pub fn on_method_call(&self, call: MethodCall, responder: Responder) {
        if call.method == METHOD_SEND {
            self.send(&call, responder);
        } else {
            debug!("method not implemented");
            responder.not_implemented();
        }
    }

    /// Validate, build and launch. The responder is answered now on failure,
    /// or later through [`Self::on_activity_result`] on success.
    pub fn send(&self, call: &MethodCall, responder: Responder) {
        let intent = match self.prepare(call) {
            Ok(intent) => intent,
            Err(e) => {
                warn!(code = e.code(), error = %e, "send rejected");
                responder.error(&e);
                return;
            }
        };

        let token = self.token();
        let handle = match self.sessions.begin(token, responder) {
            Ok(handle) => handle,
            Err(responder) => {
                warn!(%token, "send rejected: previous send still awaiting result");
                responder.error(&PostkarteError::Busy);
                return;
            }
        };

        if let Err(e) = self.bridge.launch(&intent, token) {
            warn!(session = %handle.id, error = %e, "launch failed");
            if let Some(responder) = self.sessions.cancel(&handle) {
                responder.error(&e);
            }
            return;
        }

        info!(
            session = %handle.id,
            action = intent.action.intent_action(),
            attachments = intent.streams.len(),
            "mail app launched, awaiting result"
        );
    }

    /// Everything up to (not including) the launch.
    fn prepare(&self, call: &MethodCall) -> Result<ShareIntent> {
        let request = SendRequest::from_call(call)?;

        if !self.bridge.has_context() {
            return Err(PostkarteError::NoContext);
        }

        let intent = build_intent(&request, &*self.bridge, &self.config)?;

        if !self.bridge.can_handle(&intent)? {
            return Err(PostkarteError::NotAvailable);
        }
        Ok(intent)
    }

    /// Platform notification that a launched activity returned.
    ///
    /// Returns `true` (consumed) iff `request_code` is ours; other codes
    /// belong to someone else and pass through. `result_code` is logged
    /// but does not affect the outcome.
    #[instrument(skip(self))]
    pub fn on_activity_result(&self, request_code: i32, result_code: i32) -> bool {
        let token = CorrelationToken(request_code);
        if token != self.token() {
            debug!("activity result not ours, passing through");
            return false;
        }

        if !self.sessions.complete(token) {
            debug!("activity result for our request code with no pending send");
        }
        true
    }
}

impl std::fmt::Debug for EmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSender")
            .field("platform", &self.bridge.platform_name())
            .field("config", &self.config)
            .field("sessions", &self.sessions)
            .finish()
    }
}
