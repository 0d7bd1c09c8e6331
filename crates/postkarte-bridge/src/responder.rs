// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-shot reply handle for a method call.

use postkarte_core::error::PostkarteError;
use postkarte_core::types::MethodResponse;
use serde_json::Value;
use tokio::sync::oneshot;

type ReplyFn = Box<dyn FnOnce(MethodResponse) + Send>;

/// The caller's callback handle. Consumed by the single reply it delivers.
pub struct Responder {
    reply: ReplyFn,
}

impl Responder {
    /// Wrap an arbitrary reply callback (e.g. a JNI call into the host).
    pub fn new(reply: impl FnOnce(MethodResponse) + Send + 'static) -> Self {
        Self {
            reply: Box::new(reply),
        }
    }

    /// A responder paired with a receiver, for async callers.
    ///
    /// If the receiver is dropped before the reply arrives, the reply is
    /// discarded.
    pub fn channel() -> (Self, oneshot::Receiver<MethodResponse>) {
        let (tx, rx) = oneshot::channel();
        let responder = Self::new(move |response| {
            let _ = tx.send(response);
        });
        (responder, rx)
    }

    pub fn success(self, value: Option<Value>) {
        self.respond(MethodResponse::Success(value));
    }

    pub fn error(self, err: &PostkarteError) {
        self.respond(MethodResponse::error(err));
    }

    pub fn not_implemented(self) {
        self.respond(MethodResponse::NotImplemented);
    }

    pub fn respond(self, response: MethodResponse) {
        (self.reply)(response);
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder").finish_non_exhaustive()
    }
}
