//! Per-identity mutual exclusion.

use senatus_types::PlatformUserId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per chat identity, created on first use.
///
/// Two `verify` calls for the same identity run one after the other; calls
/// for different identities never wait on each other.
#[derive(Default)]
pub struct IdentityLocks {
    locks: Mutex<HashMap<PlatformUserId, Arc<AsyncMutex<()>>>>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, id: &PlatformUserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // drop entries nobody is holding or waiting on
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks.entry(id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Identities with a live or waited-on lock.
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|l| Arc::strong_count(l) > 1)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_identity_is_serialised() {
        let locks = Arc::new(IdentityLocks::new());
        let id = PlatformUserId::new("1");
        let guard = locks.lock(&id).await;

        let contender = {
            let locks = locks.clone();
            let id = id.clone();
            tokio::spawn(async move {
                let _g = locks.lock(&id).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_identities_do_not_block() {
        let locks = IdentityLocks::new();
        let _a = locks.lock(&PlatformUserId::new("a")).await;
        let _b = tokio::time::timeout(
            Duration::from_millis(100),
            locks.lock(&PlatformUserId::new("b")),
        )
        .await
        .unwrap();
        assert_eq!(locks.active(), 2);
    }

    #[tokio::test]
    async fn released_locks_are_pruned() {
        let locks = IdentityLocks::new();
        drop(locks.lock(&PlatformUserId::new("a")).await);
        let _b = locks.lock(&PlatformUserId::new("b")).await;
        assert_eq!(locks.active(), 1);
    }
}
