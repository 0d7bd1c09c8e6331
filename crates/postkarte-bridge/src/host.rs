// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The host activity a bridge launches from, while one is attached.
//
// Hosts attach and detach as their activity comes and goes (configuration
// changes, backgrounding). Between a detach and the next attach there is no
// context, and sends report "error" instead of reaching for a stale one.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

/// Slot holding the currently attached host, if any.
pub struct HostSlot<T> {
    current: RwLock<Option<Arc<T>>>,
}

impl<T> HostSlot<T> {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Attach `host`, returning the one it replaces.
    pub fn attach(&self, host: T) -> Option<Arc<T>> {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::new(host));
        debug!(replaced = previous.is_some(), "host attached");
        previous
    }

    /// Detach the current host. `None` if nothing was attached.
    pub fn detach(&self) -> Option<Arc<T>> {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        debug!(was_attached = previous.is_some(), "host detached");
        previous
    }

    /// The attached host. The lock is not held while the caller uses it.
    pub fn current(&self) -> Option<Arc<T>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_attached(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<T> Default for HostSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_detached() {
        let slot: HostSlot<&str> = HostSlot::new();
        assert!(!slot.is_attached());
        assert!(slot.current().is_none());
        assert!(slot.detach().is_none());
    }

    #[test]
    fn attach_then_detach() {
        let slot = HostSlot::new();
        assert!(slot.attach("main activity").is_none());
        assert!(slot.is_attached());
        assert_eq!(slot.current().as_deref(), Some(&"main activity"));

        let detached = slot.detach().expect("was attached");
        assert_eq!(*detached, "main activity");
        assert!(!slot.is_attached());
    }

    #[test]
    fn reattach_replaces_previous_host() {
        let slot = HostSlot::new();
        slot.attach(1);
        let previous = slot.attach(2).expect("previous host");
        assert_eq!(*previous, 1);
        assert_eq!(slot.current().as_deref(), Some(&2));
    }

    #[test]
    fn borrowed_host_outlives_detach() {
        let slot = HostSlot::new();
        slot.attach(String::from("activity"));
        let held = slot.current().expect("attached");
        slot.detach();
        assert_eq!(held.as_str(), "activity");
        assert!(!slot.is_attached());
    }
}
