use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// In-process mutual exclusion per upload identifier.
///
/// Storing a chunk, checking completion and combining must happen as one
/// unit for a given upload; [`UploadLocks::with_lock`] serializes those
/// units while letting different uploads proceed in parallel. This does not
/// coordinate several processes sharing one storage root.
#[derive(Debug, Default)]
pub struct UploadLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UploadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `identifier`.
    pub fn with_lock<T>(&self, identifier: &str, f: impl FnOnce() -> T) -> T {
        let lock = self.handle(identifier);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of identifiers with a live lock.
    pub fn len(&self) -> usize {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        prune(&mut map);
        map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn handle(&self, identifier: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        prune(&mut map);
        Arc::clone(map.entry(identifier.to_string()).or_default())
    }
}

/// Drops locks nobody holds or waits on.
fn prune(map: &mut HashMap<String, Arc<Mutex<()>>>) {
    map.retain(|_, lock| Arc::strong_count(lock) > 1);
}
