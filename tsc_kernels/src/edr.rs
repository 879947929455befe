//! Edit Distance on Real sequence.

use tsc_data::{DataPoint, SeriesRef};
use tsc_traits::error::Result as CoreResult;
use tsc_traits::kernel::DistanceKernel;

use crate::error::{KernelError, Result};
use crate::memo::Memo;
use crate::window::{ItakuraCache, Window, sakoe_chiba_bounds};

/// Sentinel for "no path", one below `i64::MAX` so `saturating_add` never
/// needs to wrap further.
const EDR_SENTINEL: i64 = i64::MAX - 1;

#[derive(Debug)]
pub struct EdrKernel {
    epsilon: f64,
    window: Window,
    memo: Memo,
    itakura: ItakuraCache,
}

impl EdrKernel {
    pub fn new(epsilon: f64, storing: bool) -> Result<Self> {
        Self::validate_epsilon(epsilon)?;
        Ok(Self {
            epsilon,
            window: Window::None,
            memo: Memo::new(storing),
            itakura: ItakuraCache::default(),
        })
    }

    pub fn windowed(epsilon: f64, window: Window, storing: bool) -> Result<Self> {
        Self::validate_epsilon(epsilon)?;
        window.validate()?;
        Ok(Self {
            epsilon,
            window,
            memo: Memo::new(storing),
            itakura: ItakuraCache::default(),
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<()> {
        Self::validate_epsilon(epsilon)?;
        self.epsilon = epsilon;
        self.memo.clear();
        Ok(())
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn set_window(&mut self, window: Window) -> Result<()> {
        window.validate()?;
        self.window = window;
        self.memo.clear();
        Ok(())
    }

    fn validate_epsilon(epsilon: f64) -> Result<()> {
        if epsilon.is_nan() || epsilon < 0.0 {
            return Err(KernelError::InvalidParameter(format!(
                "epsilon must be >= 0, got {epsilon}"
            )));
        }
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
        let raw = match self.window {
            Window::None => edr_unconstrained(a.points(), b.points(), self.epsilon),
            Window::SakoeChiba { r, w } => {
                Self::check_equal_length(a, b)?;
                let margin = self.window.margin(a.len());
                let bounds = sakoe_chiba_bounds(a.len(), r, w);
                edr_windowed(a.points(), b.points(), self.epsilon, &bounds, margin)
            }
            Window::Itakura { r, w } => {
                Self::check_equal_length(a, b)?;
                let margin = self.window.margin(a.len());
                let bounds = self.itakura.bounds(a.len(), b.len(), r, w);
                edr_windowed(a.points(), b.points(), self.epsilon, &bounds, margin)
            }
        };
        Ok(raw as f64)
    }
}

impl DistanceKernel for EdrKernel {
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
            epsilon: self.epsilon,
            window: self.window,
            memo: self.memo.fresh_copy(),
            itakura: self.itakura.clone(),
        })
    }
}

fn edr_unconstrained(a: &[DataPoint], b: &[DataPoint], epsilon: f64) -> i64 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let width = short.len();
    let mut prev: Vec<i64> = (0..=width as i64).collect();
    let mut curr = vec![0i64; width + 1];
    for i in 1..=long.len() {
        curr[0] = i as i64;
        for j in 1..=width {
            let sub = i64::from((long[i - 1].y() - short[j - 1].y()).abs() > epsilon);
            let diag = prev[j - 1].saturating_add(sub);
            let del = prev[j].saturating_add(1);
            let ins = curr[j - 1].saturating_add(1);
            curr[j] = diag.min(del).min(ins);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[width]
}

fn edr_windowed(
    a: &[DataPoint],
    b: &[DataPoint],
    epsilon: f64,
    bounds: &[(usize, usize)],
    margin: usize,
) -> i64 {
    let n = a.len();
    let mut prev = vec![EDR_SENTINEL; n + 1];
    prev[0] = 0;
    for j in 1..=n.min(margin) {
        prev[j] = j as i64;
    }
    let mut curr = vec![EDR_SENTINEL; n + 1];
    for i in 1..=n {
        curr.iter_mut().for_each(|v| *v = EDR_SENTINEL);
        curr[0] = if i <= margin { i as i64 } else { EDR_SENTINEL };
        let (lo, hi) = bounds[i - 1];
        for j in lo..=hi {
            let sub = i64::from((a[i - 1].y() - b[j - 1].y()).abs() > epsilon);
            let diag = prev[j - 1].saturating_add(sub);
            let del = prev[j].saturating_add(1);
            let ins = curr[j - 1].saturating_add(1);
            curr[j] = diag.min(del).min(ins);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}
