//! Edit distance with Real Penalty.
//!
//! The Sakoe-Chiba-windowed recurrence follows the paper's symmetric
//! `|y2 - g|` reading.

use tsc_data::{DataPoint, SeriesRef};
use tsc_traits::error::Result as CoreResult;
use tsc_traits::kernel::DistanceKernel;

use crate::error::{KernelError, Result};
use crate::memo::Memo;
use crate::window::{ItakuraCache, Window, sakoe_chiba_bounds};

#[derive(Debug)]
pub struct ErpKernel {
    g: f64,
    window: Window,
    memo: Memo,
    itakura: ItakuraCache,
}

impl ErpKernel {
    pub fn new(g: f64, storing: bool) -> Result<Self> {
        Self::validate_g(g)?;
        Ok(Self {
            g,
            window: Window::None,
            memo: Memo::new(storing),
            itakura: ItakuraCache::default(),
        })
    }

    pub fn windowed(g: f64, window: Window, storing: bool) -> Result<Self> {
        Self::validate_g(g)?;
        window.validate()?;
        Ok(Self {
            g,
            window,
            memo: Memo::new(storing),
            itakura: ItakuraCache::default(),
        })
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn set_g(&mut self, g: f64) -> Result<()> {
        Self::validate_g(g)?;
        self.g = g;
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

    fn validate_g(g: f64) -> Result<()> {
        if g.is_nan() {
            return Err(KernelError::InvalidParameter("g must not be NaN".into()));
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
        match self.window {
            Window::None => Ok(erp_unconstrained(a.points(), b.points(), self.g)),
            Window::SakoeChiba { r, w } => {
                Self::check_equal_length(a, b)?;
                let margin = self.window.margin(a.len());
                let bounds = sakoe_chiba_bounds(a.len(), r, w);
                Ok(erp_windowed(a.points(), b.points(), self.g, &bounds, margin))
            }
            Window::Itakura { r, w } => {
                Self::check_equal_length(a, b)?;
                let margin = self.window.margin(a.len());
                let bounds = self.itakura.bounds(a.len(), b.len(), r, w);
                Ok(erp_windowed(a.points(), b.points(), self.g, &bounds, margin))
            }
        }
    }
}

impl DistanceKernel for ErpKernel {
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
            g: self.g,
            window: self.window,
            memo: self.memo.fresh_copy(),
            itakura: self.itakura.clone(),
        })
    }
}

fn erp_unconstrained(a: &[DataPoint], b: &[DataPoint], g: f64) -> f64 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let width = short.len();

    let mut prev = vec![0.0f64; width + 1];
    let mut acc = 0.0;
    for j in 1..=width {
        acc += (short[j - 1].y() - g).abs();
        prev[j] = acc;
    }

    let mut curr = vec![0.0f64; width + 1];
    let mut row_acc = 0.0;
    for i in 1..=long.len() {
        row_acc += (long[i - 1].y() - g).abs();
        curr[0] = row_acc;
        for j in 1..=width {
            let diag = prev[j - 1] + (long[i - 1].y() - short[j - 1].y()).abs();
            let del = prev[j] + (long[i - 1].y() - g).abs();
            let ins = curr[j - 1] + (short[j - 1].y() - g).abs();
            curr[j] = diag.min(del).min(ins);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[width]
}

fn erp_windowed(
    a: &[DataPoint],
    b: &[DataPoint],
    g: f64,
    bounds: &[(usize, usize)],
    margin: usize,
) -> f64 {
    let n = a.len();
    let mut prev = vec![f64::INFINITY; n + 1];
    prev[0] = 0.0;
    let mut acc = 0.0;
    for j in 1..=n {
        acc += (b[j - 1].y() - g).abs();
        if j <= margin {
            prev[j] = acc;
        }
    }

    let mut curr = vec![f64::INFINITY; n + 1];
    let mut row_acc = 0.0;
    for i in 1..=n {
        row_acc += (a[i - 1].y() - g).abs();
        curr.iter_mut().for_each(|v| *v = f64::INFINITY);
        curr[0] = if i <= margin { row_acc } else { f64::INFINITY };
        let (lo, hi) = bounds[i - 1];
        for j in lo..=hi {
            let diag = prev[j - 1] + (a[i - 1].y() - b[j - 1].y()).abs();
            let del = prev[j] + (a[i - 1].y() - g).abs();
            let ins = curr[j - 1] + (b[j - 1].y() - g).abs();
            curr[j] = diag.min(del).min(ins);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}
