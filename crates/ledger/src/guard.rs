//! Per-account exclusive access.
//!
//! Every write scope acquires the guards of all accounts it touches before it
//! takes a database connection, always in ascending identity order. Two scopes
//! sharing an account are serialized; scopes on disjoint accounts never wait on
//! each other.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Slots = Arc<DashMap<String, Arc<Mutex<()>>>>;

#[derive(Debug, Default)]
pub(crate) struct RowLocks {
    slots: Slots,
}

impl RowLocks {
    /// Lock every identity in `identities`, sorted and deduplicated.
    pub(crate) async fn acquire(&self, identities: &[&str]) -> RowGuard {
        let mut ordered = identities.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        // Built before the first await so a cancelled acquisition still
        // releases and prunes whatever it reached.
        let mut guard = RowGuard {
            slots: Arc::clone(&self.slots),
            held: Vec::with_capacity(ordered.len()),
            waiting: None,
        };
        for identity in ordered {
            // The shard lock is released at the end of this statement, before
            // awaiting the row mutex.
            let slot = self.slots.entry(identity.to_string()).or_default().clone();
            guard.waiting = Some(identity.to_string());
            let locked = slot.lock_owned().await;
            guard.waiting = None;
            guard.held.push((identity.to_string(), locked));
        }

        guard
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

/// Exclusive access to a set of account rows; released on drop.
#[derive(Debug)]
pub(crate) struct RowGuard {
    slots: Slots,
    held: Vec<(String, OwnedMutexGuard<()>)>,
    waiting: Option<String>,
}

impl RowGuard {
    pub(crate) fn holds(&self, identity: &str) -> bool {
        self.held.iter().any(|(held, _)| held == identity)
    }

    fn prune(&self, identity: &str) {
        // Nobody else can clone the slot while `remove_if` holds the shard.
        self.slots
            .remove_if(identity, |_, slot| Arc::strong_count(slot) == 1);
    }
}

impl Drop for RowGuard {
    fn drop(&mut self) {
        for (identity, guard) in std::mem::take(&mut self.held) {
            drop(guard);
            self.prune(&identity);
        }
        if let Some(identity) = self.waiting.take() {
            self.prune(&identity);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn guard_covers_requested_rows() {
        let locks = RowLocks::default();
        let guard = locks.acquire(&["bob", "alice", "bob"]).await;
        assert!(guard.holds("alice"));
        assert!(guard.holds("bob"));
        assert!(!guard.holds("carol"));
        assert_eq!(guard.held.len(), 2);
        assert_eq!(guard.held[0].0, "alice");
    }

    #[tokio::test]
    async fn shared_row_is_exclusive() {
        let locks = Arc::new(RowLocks::default());
        let first = locks.acquire(&["alice", "bob"]).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(&["bob", "carol"]).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(first);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn disjoint_rows_do_not_wait() {
        let locks = RowLocks::default();
        let _first = locks.acquire(&["alice"]).await;
        let second = tokio::time::timeout(Duration::from_millis(100), locks.acquire(&["bob"])).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn released_slots_are_pruned() {
        let locks = RowLocks::default();
        let guard = locks.acquire(&["alice", "bob"]).await;
        assert_eq!(locks.len(), 2);
        drop(guard);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn cancelled_acquire_releases_what_it_took() {
        let locks = RowLocks::default();
        let bob = locks.acquire(&["bob"]).await;

        // Takes alice, then waits on bob until the timeout cancels it.
        let cancelled =
            tokio::time::timeout(Duration::from_millis(20), locks.acquire(&["alice", "bob"])).await;
        assert!(cancelled.is_err());

        let alice = tokio::time::timeout(Duration::from_millis(100), locks.acquire(&["alice"])).await;
        assert!(alice.is_ok());
        drop(alice);
        drop(bob);
        assert_eq!(locks.len(), 0);
    }
}
