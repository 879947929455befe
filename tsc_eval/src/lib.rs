#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
//! The three resampling evaluators — Leave-One-Out, Holdout, k-fold
//! cross-validation — each implementing `tsc_traits::evaluator::Evaluator`
//! with the same resumable-progress and sequential/parallel-fan-out
//! shape, sharing that shape through `state::FoldProgress` and
//! `progress::ProgressReporter`.

mod holdout;
mod kfold;
mod loo;
mod progress;
mod state;

pub use holdout::Holdout;
pub use kfold::KFoldCv;
pub use loo::LeaveOneOut;
