use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Keys of submissions currently waiting on a webhook.
#[derive(Clone, Debug, Default)]
pub struct InFlight(Arc<Mutex<HashSet<String>>>);

/// Marks a key as busy until dropped.
#[derive(Debug)]
pub struct Guard {
    keys: InFlight,
    key: String,
}

impl InFlight {
    /// Claims `key`, or returns `None` if a submission for it is already
    /// in progress.
    pub fn try_begin(&self, key: impl Into<String>) -> Option<Guard> {
        let key = key.into();
        if !self.lock().insert(key.clone()) {
            return None;
        }
        Some(Guard {
            keys: self.clone(),
            key,
        })
    }

    pub fn is_busy(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        self.keys.lock().remove(&self.key);
    }
}
