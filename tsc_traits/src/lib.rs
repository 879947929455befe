#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
//! Capability traits consumed and produced at the evaluation core's
//! boundary.
//!
//! Kernels, tuners, and evaluators are modeled as capability sets: small
//! traits with default-`None` accessor methods for the optional marker
//! capabilities (`Multithreaded`, `Resumable`, `Copyable`, ...), plus a
//! closed `ParamValue` enum for heterogeneous tuner parameter values.

pub mod callback;
pub mod classifier;
pub mod error;
pub mod evaluator;
pub mod kernel;
pub mod param;
pub mod representation;
pub mod tuner;

pub use callback::Callback;
pub use classifier::{Classifier, CopyableClassifier, DistanceBased, Multithreaded, Resumable};
pub use error::{CoreError, Result};
pub use evaluator::{Evaluator, FoldResult};
pub use kernel::DistanceKernel;
pub use param::ParamValue;
pub use representation::Representation;
pub use tuner::{CopyableTuner, Tuner};
