/// Keyed mutual exclusion
///
/// One async mutex per key, created on first use and dropped from the map
/// when the last holder or waiter goes away. Waiters on a key are served in
/// FIFO order (tokio's mutex is fair); different keys never block each other.
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct KeyedLock {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// A caller's claim on one key's mutex; unregisters the key on drop if
/// nobody else is using it.
struct KeySlot<'a> {
    gate: &'a KeyedLock,
    key: String,
    lock: Arc<Mutex<()>>,
}

impl<'a> KeySlot<'a> {
    fn claim(gate: &'a KeyedLock, key: &str) -> Self {
        let mut locks = gate.locks.lock().unwrap_or_else(|e| e.into_inner());
        let lock = Arc::clone(locks.entry(key.to_string()).or_default());
        Self {
            gate,
            key: key.to_string(),
            lock,
        }
    }
}

impl Drop for KeySlot<'_> {
    fn drop(&mut self) {
        let mut locks = self.gate.locks.lock().unwrap_or_else(|e| e.into_inner());
        // map + this slot
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.key);
        }
    }
}

impl KeyedLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`
    ///
    /// The lock is released however `f` finishes: normal return, error
    /// value, panic, or the returned future being dropped.
    pub async fn with_lock<F, Fut, T>(&self, key: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let slot = KeySlot::claim(self, key);
        let _guard = slot.lock.lock().await;
        f().await
    }

    /// Number of keys currently held or waited on
    pub fn active_keys(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
