//! In-flight tracking for user-triggered actions.
//!
//! A control is disabled while its flag is set; a second submission on the
//! same target is rejected without issuing a request. Guards clear the flag
//! on drop, so an error or early return never leaves a control stuck.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::sync::lock;

/// A single busy flag, e.g. for a form's submit button.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    inner: Arc<AtomicBool>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }

    /// Sets the flag, or returns `None` if it was already set.
    pub fn try_begin(&self) -> Option<BusyGuard> {
        self.inner
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard {
                inner: Arc::clone(&self.inner),
            })
    }
}

#[derive(Debug)]
pub struct BusyGuard {
    inner: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner.store(false, Ordering::SeqCst);
    }
}

/// Per-key busy flags; keys are independent of each other.
#[derive(Debug)]
pub struct BusyMap<K, A> {
    inner: Arc<Mutex<HashMap<K, A>>>,
}

impl<K, A> Default for BusyMap<K, A> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, A> Clone for BusyMap<K, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, A> BusyMap<K, A>
where
    K: Eq + Hash + Clone,
    A: Copy,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// The action in flight for `key`, if any.
    pub fn get(&self, key: &K) -> Option<A> {
        lock(&self.inner).get(key).copied()
    }

    pub fn is_busy(&self, key: &K) -> bool {
        lock(&self.inner).contains_key(key)
    }

    pub fn in_flight(&self) -> usize {
        lock(&self.inner).len()
    }

    /// Marks `key` busy with `action`, or returns the action already in
    /// flight.
    pub fn try_begin(&self, key: K, action: A) -> Result<BusyMapGuard<K, A>, A> {
        let mut map = lock(&self.inner);
        if let Some(current) = map.get(&key) {
            return Err(*current);
        }
        map.insert(key.clone(), action);
        Ok(BusyMapGuard {
            inner: Arc::clone(&self.inner),
            key: Some(key),
        })
    }
}

#[derive(Debug)]
pub struct BusyMapGuard<K: Eq + Hash, A> {
    inner: Arc<Mutex<HashMap<K, A>>>,
    key: Option<K>,
}

impl<K: Eq + Hash, A> Drop for BusyMapGuard<K, A> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            lock(&self.inner).remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_rejects_second_begin_until_dropped() {
        let flag = BusyFlag::new();
        let guard = flag.try_begin().unwrap();
        assert!(flag.is_busy());
        assert!(flag.try_begin().is_none());
        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_begin().is_some());
    }

    #[test]
    fn test_map_keys_are_independent() {
        let map: BusyMap<String, &'static str> = BusyMap::new();
        let a = map.try_begin("a".into(), "retry").unwrap();
        let _b = map.try_begin("b".into(), "delete").unwrap();
        assert_eq!(map.try_begin("a".into(), "delete").unwrap_err(), "retry");
        assert_eq!(map.in_flight(), 2);
        drop(a);
        assert!(!map.is_busy(&"a".to_string()));
        assert_eq!(map.get(&"b".to_string()), Some("delete"));
    }
}
