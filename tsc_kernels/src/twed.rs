//! Time Warp Edit Distance, parameterized by stiffness `nu` and
//! insert/delete penalty `lambda`. Unwindowed: window constraints apply
//! only to DTW/EDR/ERP here.

use tsc_data::{DataPoint, SeriesRef};
use tsc_traits::error::Result as CoreResult;
use tsc_traits::kernel::DistanceKernel;

use crate::error::{KernelError, Result};
use crate::memo::Memo;

#[derive(Debug)]
pub struct TwedKernel {
    nu: f64,
    lambda: f64,
    memo: Memo,
}

impl TwedKernel {
    pub fn new(nu: f64, lambda: f64, storing: bool) -> Result<Self> {
        Self::validate(nu, lambda)?;
        Ok(Self {
            nu,
            lambda,
            memo: Memo::new(storing),
        })
    }

    pub fn nu(&self) -> f64 {
        self.nu
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn set_nu(&mut self, nu: f64) -> Result<()> {
        Self::validate(nu, self.lambda)?;
        self.nu = nu;
        self.memo.clear();
        Ok(())
    }

    pub fn set_lambda(&mut self, lambda: f64) -> Result<()> {
        Self::validate(self.nu, lambda)?;
        self.lambda = lambda;
        self.memo.clear();
        Ok(())
    }

    fn validate(nu: f64, lambda: f64) -> Result<()> {
        if nu.is_nan() || nu < 0.0 {
            return Err(KernelError::InvalidParameter(format!(
                "nu must be >= 0, got {nu}"
            )));
        }
        if lambda.is_nan() || lambda < 0.0 {
            return Err(KernelError::InvalidParameter(format!(
                "lambda must be >= 0, got {lambda}"
            )));
        }
        Ok(())
    }
}

impl DistanceKernel for TwedKernel {
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn distance(&self, a: &SeriesRef, b: &SeriesRef) -> CoreResult<f64> {
        if let Some(cached) = self.memo.get(a, b) {
            return Ok(cached);
        }
        let value = twed(a.points(), b.points(), self.nu, self.lambda);
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
            nu: self.nu,
            lambda: self.lambda,
            memo: self.memo.fresh_copy(),
        })
    }
}

/// Boundary convention: the "virtual predecessor" of each series' first
/// point is the point itself, so the delete/match terms at `i == 1` or
/// `j == 1` degenerate to a zero local delta rather than indexing before
/// the series start.
fn twed(a: &[DataPoint], b: &[DataPoint], nu: f64, lambda: f64) -> f64 {
    let n = a.len();
    let m = b.len();
    if n == 0 && m == 0 {
        return 0.0;
    }

    let pred_a = |i: usize| if i >= 2 { a[i - 2] } else { a[0] };
    let pred_b = |j: usize| if j >= 2 { b[j - 2] } else { b[0] };
    let delete_cost_a = |i: usize| {
        let cur = a[i - 1];
        let prev = pred_a(i);
        (cur.y() - prev.y()).abs() + nu * (cur.x() - prev.x()).abs() + lambda
    };
    let delete_cost_b = |j: usize| {
        let cur = b[j - 1];
        let prev = pred_b(j);
        (cur.y() - prev.y()).abs() + nu * (cur.x() - prev.x()).abs() + lambda
    };

    let mut prev_row = vec![0.0f64; m + 1];
    for j in 1..=m {
        prev_row[j] = prev_row[j - 1] + delete_cost_b(j);
    }

    let mut curr_row = vec![0.0f64; m + 1];
    for i in 1..=n {
        curr_row[0] = prev_row[0] + delete_cost_a(i);
        for j in 1..=m {
            let del_a = prev_row[j] + delete_cost_a(i);
            let del_b = curr_row[j - 1] + delete_cost_b(j);
            let a_cur = a[i - 1];
            let a_prev = pred_a(i);
            let b_cur = b[j - 1];
            let b_prev = pred_b(j);
            let matched = prev_row[j - 1]
                + (a_cur.y() - b_cur.y()).abs()
                + (a_prev.y() - b_prev.y()).abs()
                + nu * ((a_cur.x() - b_cur.x()).abs() + (a_prev.x() - b_prev.x()).abs());
            curr_row[j] = del_a.min(del_b).min(matched);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }
    prev_row[m]
}
