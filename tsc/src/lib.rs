#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
//! Facade over the evaluation harness's crates: capability traits, the
//! data model, distance kernels, the tuner chain, the resampling
//! evaluators, and the configuration envelope, plus [`fixtures`] — a
//! minimal reference classifier used by this crate's own integration
//! tests (not a production classifier recommendation).
//!
//! No CLI, no binary: the harness has no file or network surface, so
//! there is nothing for a command-line entry point to front.

pub mod fixtures;

pub use tsc_config::{ConfigError, Options};
pub use tsc_data::{DataPoint, Dataset, SeriesRef, TimeSeries};
pub use tsc_eval::{Holdout, KFoldCv, LeaveOneOut};
pub use tsc_executor::{CancellationToken, StepCallback, ThreadCountGuard, WorkerPool};
pub use tsc_kernels::{DtwKernel, EdrKernel, ErpKernel, TwedKernel, Window};
pub use tsc_traits::{
    Callback, Classifier, CopyableClassifier, CopyableTuner, DistanceBased, DistanceKernel, Evaluator,
    FoldResult, Multithreaded, ParamValue, Representation, Resumable, Tuner,
};
pub use tsc_traits::evaluator::CopyableEvaluator;
pub use tsc_tuner::{ClassifierModifier, DistanceModifier, GridTuner, Modifier};
