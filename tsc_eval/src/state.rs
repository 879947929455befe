//! Per-evaluator resumable progress: which folds have been scored, their
//! retained [`FoldResult`]s, and the running micro-averaged error.
//!
//! Kept separate from the three evaluators so `reset()`/resumption/error
//! aggregation are implemented exactly once instead of three times.

use tsc_traits::evaluator::FoldResult;

#[derive(Debug, Default)]
pub(crate) struct FoldProgress {
    done: Vec<bool>,
    fold_results: Vec<FoldResult>,
    misclassified_total: usize,
    tested_total: usize,
    started: bool,
}

impl FoldProgress {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            done: vec![false; n],
            fold_results: Vec::new(),
            misclassified_total: 0,
            tested_total: 0,
            started: false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.done.len()
    }

    pub(crate) fn completed(&self) -> usize {
        self.done.iter().filter(|d| **d).count()
    }

    /// Indices of folds not yet scored, in ascending order. A call to
    /// `evaluate` after a cancellation re-enters here and only replays
    /// these.
    pub(crate) fn remaining(&self) -> Vec<usize> {
        self.done
            .iter()
            .enumerate()
            .filter(|(_, done)| !**done)
            .map(|(i, _)| i)
            .collect()
    }

    pub(crate) fn record(&mut self, index: usize, result: FoldResult) {
        self.misclassified_total += result.misclassified;
        self.tested_total += result.testset.len();
        self.fold_results.push(result);
        self.done[index] = true;
    }

    /// Micro-averaged error across every retained fold:
    /// `(Σ misclassified) / (Σ |testset|)`.
    pub(crate) fn error(&self) -> f64 {
        if self.tested_total == 0 {
            0.0
        } else {
            self.misclassified_total as f64 / self.tested_total as f64
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        !self.done.is_empty() && self.done.iter().all(|d| *d)
    }

    pub(crate) fn in_progress(&self) -> bool {
        self.started && !self.is_done()
    }

    pub(crate) fn begin(&mut self) {
        self.started = true;
    }

    /// A call completed without error (whether or not every fold is done
    /// yet is tracked separately by `is_done`); a `Cancelled` error must
    /// NOT call this, so the resumable state survives re-entry.
    pub(crate) fn end(&mut self) {
        self.started = false;
    }

    pub(crate) fn results(&self) -> &[FoldResult] {
        &self.fold_results
    }

    pub(crate) fn misclassified(&self) -> i32 {
        self.misclassified_total as i32
    }

    pub(crate) fn reset(&mut self) {
        let n = self.done.len();
        *self = Self::new(n);
    }
}
