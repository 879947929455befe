//! Dynamic Time Warping, unconstrained and windowed.

use tsc_data::{DataPoint, SeriesRef};
use tsc_traits::error::Result as CoreResult;
use tsc_traits::kernel::DistanceKernel;

use crate::error::{KernelError, Result};
use crate::memo::Memo;
use crate::window::{ItakuraCache, Window, sakoe_chiba_bounds};

/// `D[i,j] = (a_i - b_j)^2 + min(D[i-1,j], D[i,j-1], D[i-1,j-1])`, returned
/// unsquare-rooted — callers compare on squared values.
#[derive(Debug)]
pub struct DtwKernel {
    window: Window,
    memo: Memo,
    itakura: ItakuraCache,
}

impl DtwKernel {
    pub fn new(storing: bool) -> Self {
        Self {
            window: Window::None,
            memo: Memo::new(storing),
            itakura: ItakuraCache::default(),
        }
    }

    pub fn windowed(window: Window, storing: bool) -> Result<Self> {
        window.validate()?;
        Ok(Self {
            window,
            memo: Memo::new(storing),
            itakura: ItakuraCache::default(),
        })
    }

    pub fn window(&self) -> Window {
        self.window
    }

    /// Any parameter change that affects the distance function invalidates
    /// the memo synchronously.
    pub fn set_window(&mut self, window: Window) -> Result<()> {
        window.validate()?;
        self.window = window;
        self.memo.clear();
        Ok(())
    }

    fn check_equal_length(a: &SeriesRef, b: &SeriesRef) -> Result<()> {
        if a.len() != b.len() {
            return Err(KernelError::IncomparableSeries {
                len_a: a.len(),
                len_b: b.len(),
            });
        }
        Ok(())
    }

    fn compute(&self, a: &SeriesRef, b: &SeriesRef) -> Result<f64> {
        match self.window {
            Window::None => Ok(dtw_unconstrained(a.points(), b.points())),
            Window::SakoeChiba { r, w } => {
                Self::check_equal_length(a, b)?;
                let bounds = sakoe_chiba_bounds(a.len(), r, w);
                Ok(dtw_windowed(a.points(), b.points(), &bounds))
            }
            Window::Itakura { r, w } => {
                Self::check_equal_length(a, b)?;
                let bounds = self.itakura.bounds(a.len(), b.len(), r, w);
                Ok(dtw_windowed(a.points(), b.points(), &bounds))
            }
        }
    }
}

impl DistanceKernel for DtwKernel {
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn distance(&self, a: &SeriesRef, b: &SeriesRef) -> CoreResult<f64> {
        if let Some(cached) = self.memo.get(a, b) {
            return Ok(cached);
        }
        let value = self.compute(a, b)?;
        self.memo.put(a, b, value);
        Ok(value)
    }

    fn clear_storage(&self) {
        self.memo.clear();
    }

    fn set_storing(&mut self, storing: bool) {
        self.memo.set_storing(storing);
    }

    fn is_storing(&self) -> bool {
        self.memo.is_storing()
    }

    fn make_copy(&self, _deep: bool) -> Box<dyn DistanceKernel + Send> {
        Box::new(Self {
            window: self.window,
            memo: self.memo.fresh_copy(),
            itakura: self.itakura.clone(),
        })
    }
}

/// Two rolling rows of size `min(n, m) + 1`.
fn dtw_unconstrained(a: &[DataPoint], b: &[DataPoint]) -> f64 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let width = short.len();
    if width == 0 {
        return 0.0;
    }
    let mut prev = vec![f64::INFINITY; width + 1];
    let mut curr = vec![f64::INFINITY; width + 1];
    prev[0] = 0.0;
    for i in 1..=long.len() {
        curr[0] = f64::INFINITY;
        for j in 1..=width {
            let cost = (long[i - 1].y() - short[j - 1].y()).powi(2);
            curr[j] = cost + prev[j].min(curr[j - 1]).min(prev[j - 1]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[width]
}

/// Full two-row DP over equal-length series, with out-of-band cells held
/// at `+inf` so a path can never cross the window boundary.
fn dtw_windowed(a: &[DataPoint], b: &[DataPoint], bounds: &[(usize, usize)]) -> f64 {
    let n = a.len();
    let mut prev = vec![f64::INFINITY; n + 1];
    let mut curr = vec![f64::INFINITY; n + 1];
    prev[0] = 0.0;
    for i in 1..=n {
        curr.iter_mut().for_each(|v| *v = f64::INFINITY);
        let (lo, hi) = bounds[i - 1];
        for j in lo..=hi {
            let cost = (a[i - 1].y() - b[j - 1].y()).powi(2);
            curr[j] = cost + prev[j].min(curr[j - 1]).min(prev[j - 1]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tsc_data::TimeSeries;

    fn series(ys: &[f64]) -> SeriesRef {
        let mut ts = TimeSeries::new();
        for (i, y) in ys.iter().enumerate() {
            ts.push(DataPoint::new(i as f64, *y));
        }
        Arc::new(ts)
    }

    #[test]
    fn self_distance_is_zero() {
        let kernel = DtwKernel::new(false);
        let a = series(&[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(kernel.distance(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn unconstrained_warps_across_duplicated_samples() {
        // duplicated samples should warp to an exact (zero-distance) match
        let kernel = DtwKernel::new(false);
        let a = series(&[0.0, 1.0, 2.0, 3.0]);
        let b = series(&[0.0, 1.0, 1.0, 2.0, 3.0, 3.0]);
        assert_eq!(kernel.distance(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let kernel = DtwKernel::new(false);
        let a = series(&[0.0, 2.0, 1.0, 4.0]);
        let b = series(&[0.0, 1.0, 3.0]);
        assert_eq!(
            kernel.distance(&a, &b).unwrap(),
            kernel.distance(&b, &a).unwrap()
        );
    }

    #[test]
    fn sakoe_chiba_zero_window_forces_diagonal_alignment() {
        let mut kernel = DtwKernel::new(false);
        kernel
            .set_window(Window::SakoeChiba { r: 0.0, w: 0 })
            .unwrap();
        let a = series(&[0.0, 2.0, 3.0]);
        let b = series(&[0.0, 3.0, 3.0]);
        let expected = (0.0_f64 - 0.0).powi(2) + (2.0 - 3.0_f64).powi(2) + (3.0 - 3.0_f64).powi(2);
        assert_eq!(kernel.distance(&a, &b).unwrap(), expected);
    }

    #[test]
    fn mismatched_lengths_fail_under_window() {
        let mut kernel = DtwKernel::new(false);
        kernel
            .set_window(Window::SakoeChiba { r: 0.5, w: 0 })
            .unwrap();
        let a = series(&[0.0, 1.0]);
        let b = series(&[0.0, 1.0, 2.0]);
        assert!(kernel.distance(&a, &b).is_err());
    }

    #[test]
    fn changing_window_invalidates_memo() {
        let mut kernel = DtwKernel::new(true);
        let a = series(&[0.0, 1.0, 2.0]);
        let b = series(&[0.0, 1.0, 2.0]);
        kernel.distance(&a, &b).unwrap();
        assert!(!kernel.memo.is_empty());
        kernel.set_window(Window::SakoeChiba { r: 1.0, w: 0 }).unwrap();
        assert!(kernel.memo.is_empty());
    }

    #[test]
    fn copy_preserves_storing_flag_but_not_entries() {
        let kernel = DtwKernel::new(true);
        let a = series(&[0.0, 1.0]);
        let b = series(&[0.0, 2.0]);
        kernel.distance(&a, &b).unwrap();
        let copy = kernel.make_copy(true);
        assert!(copy.is_storing());
        assert_eq!(copy.distance(&a, &b).unwrap(), kernel.distance(&a, &b).unwrap());
    }
}
