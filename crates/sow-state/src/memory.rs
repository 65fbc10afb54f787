use std::sync::Mutex;

use crate::{StateStore, StateStoreError, StatusMap};

/// Process-local store. Counts saves so callers can assert write-once.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    inner: Mutex<(StatusMap, usize)>,
}

impl MemoryStateStore {
    pub fn new(initial: StatusMap) -> Self {
        Self {
            inner: Mutex::new((initial, 0)),
        }
    }

    /// Current contents.
    pub fn snapshot(&self) -> StatusMap {
        match self.inner.lock() {
            Ok(g) => g.0.clone(),
            Err(poisoned) => poisoned.into_inner().0.clone(),
        }
    }

    pub fn save_count(&self) -> usize {
        match self.inner.lock() {
            Ok(g) => g.1,
            Err(poisoned) => poisoned.into_inner().1,
        }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<StatusMap, StateStoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, statuses: &StatusMap) -> Result<(), StateStoreError> {
        let mut g = match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        g.0 = statuses.clone();
        g.1 += 1;
        Ok(())
    }
}
