// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pending send sessions, keyed by correlation token.
//
// Each token moves Idle -> AwaitingResult when a native app is launched and
// back to Idle when the platform reports that app's return. A token that is
// already awaiting refuses a second session instead of overwriting the first
// caller's responder.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use postkarte_core::types::{CorrelationToken, SessionId, SessionState};

use crate::responder::Responder;

/// Identifies one in-flight session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: SessionId,
    pub token: CorrelationToken,
    pub started_at: DateTime<Utc>,
}

struct PendingResult {
    id: SessionId,
    started_at: DateTime<Utc>,
    responder: Responder,
}

/// Registry of pending operations.
///
/// Calls and completions arrive on the host's event thread; the mutex only
/// makes the registry shareable. Responders are always invoked after the lock
/// is released.
#[derive(Default)]
pub struct SessionRegistry {
    pending: Mutex<HashMap<CorrelationToken, PendingResult>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CorrelationToken, PendingResult>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start awaiting a result for `token`.
    ///
    /// Hands the responder back untouched if `token` is already awaiting, so
    /// the caller can reject the request.
    pub fn begin(
        &self,
        token: CorrelationToken,
        responder: Responder,
    ) -> std::result::Result<SessionHandle, Responder> {
        let mut pending = self.lock();
        if pending.contains_key(&token) {
            return Err(responder);
        }

        let handle = SessionHandle {
            id: SessionId::new(),
            token,
            started_at: Utc::now(),
        };
        pending.insert(
            token,
            PendingResult {
                id: handle.id,
                started_at: handle.started_at,
                responder,
            },
        );
        debug!(session = %handle.id, %token, "session awaiting result");
        Ok(handle)
    }

    /// Resolve the session awaiting `token` with an empty success.
    ///
    /// Returns `false` if nothing was awaiting `token`.
    pub fn complete(&self, token: CorrelationToken) -> bool {
        let Some(pending) = self.lock().remove(&token) else {
            return false;
        };

        let elapsed_ms = (Utc::now() - pending.started_at).num_milliseconds();
        info!(session = %pending.id, %token, elapsed_ms, "send session completed");
        pending.responder.success(None);
        true
    }

    /// Drop the reservation made by `begin` without replying.
    ///
    /// Returns the responder so the caller can report why. `None` if the
    /// session was already completed or replaced.
    pub fn cancel(&self, handle: &SessionHandle) -> Option<Responder> {
        let mut pending = self.lock();
        match pending.get(&handle.token) {
            Some(p) if p.id == handle.id => {
                pending.remove(&handle.token).map(|p| p.responder)
            }
            _ => None,
        }
    }

    pub fn state(&self, token: CorrelationToken) -> SessionState {
        if self.lock().contains_key(&token) {
            SessionState::AwaitingResult
        } else {
            SessionState::Idle
        }
    }

    /// Number of sessions awaiting a result.
    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("pending", &self.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postkarte_core::types::MethodResponse;

    const TOKEN: CorrelationToken = CorrelationToken(607);

    #[test]
    fn begin_then_complete_round_trip() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.state(TOKEN), SessionState::Idle);

        let (responder, mut rx) = Responder::channel();
        let handle = registry.begin(TOKEN, responder).expect("begin");
        assert_eq!(handle.token, TOKEN);
        assert_eq!(registry.state(TOKEN), SessionState::AwaitingResult);

        assert!(registry.complete(TOKEN));
        assert_eq!(registry.state(TOKEN), SessionState::Idle);
        assert_eq!(rx.try_recv().expect("reply"), MethodResponse::Success(None));
    }

    #[test]
    fn completes_exactly_once() {
        let registry = SessionRegistry::new();
        let (responder, _rx) = Responder::channel();
        registry.begin(TOKEN, responder).expect("begin");

        assert!(registry.complete(TOKEN));
        assert!(!registry.complete(TOKEN));
    }

    #[test]
    fn second_begin_on_same_token_is_refused() {
        let registry = SessionRegistry::new();
        let (first, mut first_rx) = Responder::channel();
        let (second, mut second_rx) = Responder::channel();

        registry.begin(TOKEN, first).expect("begin first");
        let refused = registry.begin(TOKEN, second).expect_err("token already awaiting");
        refused.error(&postkarte_core::PostkarteError::Busy);

        assert_eq!(second_rx.try_recv().expect("reply").error_code(), Some("busy"));

        // The first caller still gets its completion.
        assert!(registry.complete(TOKEN));
        assert!(first_rx.try_recv().expect("reply").is_success());
    }

    #[test]
    fn distinct_tokens_are_independent() {
        let registry = SessionRegistry::new();
        let other = CorrelationToken(608);
        let (a, mut a_rx) = Responder::channel();
        let (b, mut b_rx) = Responder::channel();

        registry.begin(TOKEN, a).expect("begin a");
        registry.begin(other, b).expect("begin b");
        assert_eq!(registry.pending_count(), 2);

        assert!(registry.complete(other));
        assert!(b_rx.try_recv().is_ok());
        assert!(a_rx.try_recv().is_err());
        assert_eq!(registry.state(TOKEN), SessionState::AwaitingResult);
    }

    #[test]
    fn cancel_returns_responder_without_replying() {
        let registry = SessionRegistry::new();
        let (responder, mut rx) = Responder::channel();
        let handle = registry.begin(TOKEN, responder).expect("begin");

        let responder = registry.cancel(&handle).expect("still pending");
        assert!(rx.try_recv().is_err());
        assert_eq!(registry.state(TOKEN), SessionState::Idle);
        assert!(!registry.complete(TOKEN));
        drop(responder);
    }

    #[test]
    fn cancel_ignores_stale_handle() {
        let registry = SessionRegistry::new();
        let (first, _first_rx) = Responder::channel();
        let stale = registry.begin(TOKEN, first).expect("begin");
        registry.complete(TOKEN);

        let (second, _second_rx) = Responder::channel();
        registry.begin(TOKEN, second).expect("begin again");

        assert!(registry.cancel(&stale).is_none());
        assert_eq!(registry.state(TOKEN), SessionState::AwaitingResult);
    }
}
