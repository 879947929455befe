//! Identity-keyed distance memoization.
//!
//! Keyed by `(id(a), id(b))` using `Arc` pointer identity, not value
//! equality — two series with identical samples but distinct `Arc`
//! allocations are cached separately. The pair is stored in pointer order so
//! `memo(a, b) == memo(b, a)` without a second lookup.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tsc_data::SeriesRef;

#[derive(Debug, Default)]
pub struct Memo {
    storing: AtomicBool,
    cache: Mutex<HashMap<(usize, usize), f64>>,
}

impl Memo {
    pub fn new(storing: bool) -> Self {
        Self {
            storing: AtomicBool::new(storing),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn key(a: &SeriesRef, b: &SeriesRef) -> (usize, usize) {
        let pa = std::sync::Arc::as_ptr(a) as usize;
        let pb = std::sync::Arc::as_ptr(b) as usize;
        if pa <= pb { (pa, pb) } else { (pb, pa) }
    }

    pub fn get(&self, a: &SeriesRef, b: &SeriesRef) -> Option<f64> {
        if !self.is_storing() {
            return None;
        }
        self.cache
            .lock()
            .expect("memo mutex poisoned")
            .get(&Self::key(a, b))
            .copied()
    }

    pub fn put(&self, a: &SeriesRef, b: &SeriesRef, value: f64) {
        if !self.is_storing() {
            return;
        }
        self.cache
            .lock()
            .expect("memo mutex poisoned")
            .insert(Self::key(a, b), value);
    }

    pub fn clear(&self) {
        self.cache.lock().expect("memo mutex poisoned").clear();
    }

    pub fn is_storing(&self) -> bool {
        self.storing.load(Ordering::Acquire)
    }

    /// Enabling is a no-op on existing entries; disabling also drops them,
    /// applying the same invalidate-atomically discipline to the storing
    /// flag itself.
    pub fn set_storing(&self, storing: bool) {
        self.storing.store(storing, Ordering::Release);
        if !storing {
            self.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().expect("memo mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A `Copyable` copy never shares mutable cache state with its source.
    pub fn fresh_copy(&self) -> Self {
        Self::new(self.is_storing())
    }
}

impl Clone for Memo {
    fn clone(&self) -> Self {
        self.fresh_copy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsc_data::TimeSeries;

    fn series_ref() -> SeriesRef {
        std::sync::Arc::new(TimeSeries::new())
    }

    #[test]
    fn lookup_is_symmetric_in_argument_order() {
        let memo = Memo::new(true);
        let a = series_ref();
        let b = series_ref();
        memo.put(&a, &b, 42.0);
        assert_eq!(memo.get(&a, &b), Some(42.0));
        assert_eq!(memo.get(&b, &a), Some(42.0));
    }

    #[test]
    fn disabled_storing_never_caches() {
        let memo = Memo::new(false);
        let a = series_ref();
        let b = series_ref();
        memo.put(&a, &b, 1.0);
        assert_eq!(memo.get(&a, &b), None);
    }

    #[test]
    fn disabling_clears_existing_entries() {
        let memo = Memo::new(true);
        let a = series_ref();
        let b = series_ref();
        memo.put(&a, &b, 1.0);
        memo.set_storing(false);
        assert!(memo.is_empty());
    }

    #[test]
    fn fresh_copy_has_no_shared_entries() {
        let memo = Memo::new(true);
        let a = series_ref();
        let b = series_ref();
        memo.put(&a, &b, 1.0);
        let copy = memo.fresh_copy();
        assert!(copy.is_empty());
        assert!(!memo.is_empty());
    }
}
