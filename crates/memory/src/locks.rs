//! Per-owner write serialization.
//!
//! Appends for the same owner never interleave; different owners proceed
//! in parallel. Reads do not take the lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A lazily populated map of owner id to async mutex.
///
/// Entries are never removed, so the map grows with the number of distinct
/// owners a process has written for.
#[derive(Default)]
pub struct OwnerLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl OwnerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `owner_id`, created on first use.
    pub fn for_owner(&self, owner_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks
            .entry(owner_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_owner_shares_a_lock() {
        let locks = OwnerLocks::new();
        let a = locks.for_owner("alice");
        let b = locks.for_owner("alice");
        let c = locks.for_owner("bob");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn other_owner_not_blocked() {
        let locks = OwnerLocks::new();
        let alice = locks.for_owner("alice");
        let _held = alice.lock().await;
        let bob = locks.for_owner("bob");
        assert!(bob.try_lock().is_ok());
        assert!(alice.try_lock().is_err());
    }
}
