//! Per-title serialization locks

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one async mutex per title key.
///
/// Every mutating operation on a title holds that title's lock for its full
/// read-check-write span, so concurrent checkouts, returns and renewals for
/// the same title serialize while different titles proceed independently.
pub struct TitleLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl TitleLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock for a title, creating it on first use.
    pub async fn acquire(&self, title_key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().expect("title lock table poisoned");
            locks
                .entry(title_key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

impl Default for TitleLocks {
    fn default() -> Self {
        Self::new()
    }
}
