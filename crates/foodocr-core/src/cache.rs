//! Process-wide lazily-initialized read-only stores.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

struct Entry<T> {
    value: Arc<T>,
    loaded_at: Instant,
}

/// A lazily-initialized, process-wide cache around a loader function.
///
/// The first `get` triggers the load; subsequent calls reuse the cached
/// value. The lock is held across the load, so concurrent readers never
/// observe partial state and a value is loaded at most once. Tests can
/// force a reload with [`CachedStore::invalidate`].
pub struct CachedStore<T> {
    loader: fn() -> T,
    ttl: Option<Duration>,
    state: Mutex<Option<Entry<T>>>,
}

impl<T> CachedStore<T> {
    /// Create a store with no expiration.
    pub const fn new(loader: fn() -> T) -> Self {
        Self {
            loader,
            ttl: None,
            state: Mutex::new(None),
        }
    }

    /// Create a store whose value expires after `ttl`.
    pub const fn with_ttl(loader: fn() -> T, ttl: Duration) -> Self {
        Self {
            loader,
            ttl: Some(ttl),
            state: Mutex::new(None),
        }
    }

    /// Get the cached value, loading it on first access.
    pub fn get(&self) -> Arc<T> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let expired = match (&*state, self.ttl) {
            (Some(entry), Some(ttl)) => entry.loaded_at.elapsed() >= ttl,
            (Some(_), None) => false,
            (None, _) => true,
        };

        if expired {
            let value = Arc::new((self.loader)());
            *state = Some(Entry {
                value: Arc::clone(&value),
                loaded_at: Instant::now(),
            });
            return value;
        }

        match &*state {
            Some(entry) => Arc::clone(&entry.value),
            // Unreachable: `expired` covers the empty case.
            None => unreachable!("cached store state cannot be empty here"),
        }
    }

    /// Drop the cached value; the next `get` reloads.
    pub fn invalidate(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static LOAD_COUNT: AtomicUsize = AtomicUsize::new(0);

    fn counting_loader() -> usize {
        LOAD_COUNT.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[test]
    fn test_loads_once_and_invalidates() {
        let store: CachedStore<usize> = CachedStore::new(counting_loader);

        let first = store.get();
        let second = store.get();
        assert_eq!(*first, *second);

        store.invalidate();
        let third = store.get();
        assert_eq!(*third, *second + 1);
    }

    #[test]
    fn test_shared_value_is_same_allocation() {
        let store: CachedStore<String> = CachedStore::new(|| "payload".to_string());
        let a = store.get();
        let b = store.get();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
