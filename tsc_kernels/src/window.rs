//! Window-constraint helpers shared by the Sakoe-Chiba and Itakura
//! variants of DTW/EDR/ERP.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{KernelError, Result};

/// A windowing constraint narrowing which `(i, j)` cells of the DP grid a
/// kernel is allowed to visit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Window {
    /// Unconstrained: every cell is reachable.
    None,
    /// Band `|i - j| <= max(w, ceil(r * len))`.
    SakoeChiba { r: f64, w: usize },
    /// Slope-limited parallelogram (`1/2 <= j/i <= 2`) intersected with the
    /// same `max(w, ceil(r * len))` band width — the degenerate case where
    /// `r` dominates collapses to a Sakoe-Chiba band.
    Itakura { r: f64, w: usize },
}

impl Window {
    pub fn validate(self) -> Result<()> {
        match self {
            Window::None => Ok(()),
            Window::SakoeChiba { r, .. } | Window::Itakura { r, .. } => {
                if r.is_nan() || !(0.0..=1.0).contains(&r) {
                    return Err(KernelError::InvalidParameter(format!(
                        "r must be in [0, 1], got {r}"
                    )));
                }
                Ok(())
            }
        }
    }

    pub fn is_windowed(self) -> bool {
        !matches!(self, Window::None)
    }

    /// Effective half-width used both for the DP column range and to
    /// decide whether row/column 0 (the DP base cases) remain reachable.
    pub fn margin(self, len: usize) -> usize {
        match self {
            Window::None => len,
            Window::SakoeChiba { r, w } | Window::Itakura { r, w } => effective_width(len, r, w),
        }
    }
}

/// `max(absolute_w, ceil(r * len))`.
pub fn effective_width(len: usize, r: f64, w: usize) -> usize {
    let relative = (r * len as f64).ceil() as usize;
    w.max(relative)
}

/// Per-row `[lo, hi]` inclusive 1-indexed column bounds for a Sakoe-Chiba
/// band over an `n`-length grid (both series have length `n`).
pub fn sakoe_chiba_bounds(n: usize, r: f64, w: usize) -> Vec<(usize, usize)> {
    let width = effective_width(n, r, w);
    (1..=n)
        .map(|i| (i.saturating_sub(width).max(1), (i + width).min(n)))
        .collect()
}

fn itakura_bounds(n: usize, m: usize, r: f64, w: usize) -> Vec<(usize, usize)> {
    let width = effective_width(n.max(m), r, w);
    (1..=n)
        .map(|i| {
            let slope_lo = ((i as f64 / 2.0).ceil() as usize).max(1);
            let slope_hi = i.saturating_mul(2).min(m);
            let band_lo = i.saturating_sub(width).max(1);
            let band_hi = (i + width).min(m);
            let lo = slope_lo.max(band_lo).min(m);
            let hi = slope_hi.min(band_hi).max(lo);
            (lo, hi)
        })
        .collect()
}

/// Cache of precomputed Itakura parallelogram bounds, keyed by
/// `(n, m, r-bits, w)` so repeated calls over the same dataset pay the
/// precomputation once.
#[derive(Debug, Default)]
pub struct ItakuraCache {
    cache: Mutex<HashMap<(usize, usize, u64, usize), Arc<Vec<(usize, usize)>>>>,
}

impl ItakuraCache {
    pub fn bounds(&self, n: usize, m: usize, r: f64, w: usize) -> Arc<Vec<(usize, usize)>> {
        let key = (n, m, r.to_bits(), w);
        let mut cache = self.cache.lock().expect("itakura cache mutex poisoned");
        cache
            .entry(key)
            .or_insert_with(|| Arc::new(itakura_bounds(n, m, r, w)))
            .clone()
    }

    pub fn clear(&self) {
        self.cache.lock().expect("itakura cache mutex poisoned").clear();
    }
}

/// Precomputation caches are a pure performance optimization, not shared
/// state: a copy starts with an empty cache.
impl Clone for ItakuraCache {
    fn clone(&self) -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn sakoe_chiba_r_zero_w_zero_is_diagonal_only() {
        let bounds = sakoe_chiba_bounds(4, 0.0, 0);
        for (i, (lo, hi)) in bounds.into_iter().enumerate() {
            let i = i + 1;
            assert_eq!((lo, hi), (i, i));
        }
    }

    #[test]
    fn sakoe_chiba_r_one_covers_entire_grid() {
        let bounds = sakoe_chiba_bounds(5, 1.0, 0);
        for (lo, hi) in bounds {
            assert_eq!((lo, hi), (1, 5));
        }
    }

    #[rstest]
    #[case(1.5)]
    #[case(-0.1)]
    fn invalid_r_is_rejected(#[case] r: f64) {
        assert!(Window::SakoeChiba { r, w: 0 }.validate().is_err());
    }

    #[test]
    fn itakura_cache_reuses_entry_for_same_key() {
        let cache = ItakuraCache::default();
        let a = cache.bounds(5, 5, 0.2, 0);
        let b = cache.bounds(5, 5, 0.2, 0);
        assert!(Arc::ptr_eq(&a, &b));
    }
}
