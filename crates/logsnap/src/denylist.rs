//! Process-wide memo of types whose conversion has failed before.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

/// Identifiers denied from the start: their `Serialize` output is either
/// platform-specific noise or fails outright for common values.
pub const SEED_TYPES: [&str; 2] = ["std::ffi::os_str::OsString", "std::time::SystemTime"];

static GLOBAL: LazyLock<Arc<DeniedTypes>> = LazyLock::new(|| Arc::new(DeniedTypes::seeded()));

/// Append-only set of type identifiers that are never converted again.
#[derive(Debug, Default)]
pub struct DeniedTypes {
    inner: Mutex<HashSet<String>>,
}

impl DeniedTypes {
    /// An empty set; mostly useful for isolating tests.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        let set = Self::new();
        for name in SEED_TYPES {
            set.insert(name);
        }
        set
    }

    /// The instance shared by every default [`Snapshotter`](crate::Snapshotter).
    pub fn global() -> Arc<DeniedTypes> {
        Arc::clone(&GLOBAL)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.lock().contains(type_name)
    }

    /// Returns `true` when the identifier was not denied before.
    pub fn insert(&self, type_name: &str) -> bool {
        let added = self.lock().insert(type_name.to_string());
        if added {
            tracing::debug!(target: "logsnap", type_name, "type added to denylist");
        }
        added
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted copy of the current members.
    pub fn snapshot(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().iter().cloned().collect();
        names.sort();
        names
    }

    // A panic while holding the lock cannot leave the set half-updated, so a
    // poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_with_known_types() {
        let set = DeniedTypes::seeded();
        assert_eq!(set.len(), 2);
        assert!(set.contains("std::time::SystemTime"));
        assert!(set.contains("std::ffi::os_str::OsString"));
    }

    #[test]
    fn insert_is_idempotent() {
        let set = DeniedTypes::new();
        assert!(set.insert("app::Broken"));
        assert!(!set.insert("app::Broken"));
        assert_eq!(set.snapshot(), vec!["app::Broken".to_string()]);
    }

    #[test]
    fn concurrent_inserts_are_all_kept() {
        let set = Arc::new(DeniedTypes::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let set = Arc::clone(&set);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        set.insert(&format!("app::T{}", i * 50 + j));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(set.len(), 400);
    }
}
