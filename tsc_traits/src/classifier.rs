//! The classifier capability consumed by the core, plus its optional
//! marker capabilities (`DistanceBased`, `Multithreaded`, `Resumable`,
//! `Copyable`) exposed as default-`None` accessor methods: capability
//! sets in place of an inheritance hierarchy.

use tsc_data::{Dataset, SeriesRef};

use crate::error::Result;
use crate::kernel::DistanceKernel;

pub trait Classifier: Send {
    /// Called exactly once per tuned configuration before classification.
    fn fit(&mut self, trainset: &Dataset) -> Result<()>;

    /// Thread-safe only across distinct classifier copies; a single
    /// instance is not required to be internally thread-safe.
    fn classify(&self, series: &SeriesRef) -> Result<f64>;

    /// Lets a `Modifier` downcast to the concrete classifier type to reach
    /// a hyperparameter the capability traits below don't name (e.g. `k`
    /// in a kNN classifier). Implementations are always `self`.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;

    fn as_distance_based(&self) -> Option<&dyn DistanceBased> {
        None
    }
    fn as_distance_based_mut(&mut self) -> Option<&mut dyn DistanceBased> {
        None
    }
    fn as_multithreaded(&self) -> Option<&dyn Multithreaded> {
        None
    }
    fn as_multithreaded_mut(&mut self) -> Option<&mut dyn Multithreaded> {
        None
    }
    fn as_resumable_mut(&mut self) -> Option<&mut dyn Resumable> {
        None
    }
    fn as_copyable(&self) -> Option<&dyn CopyableClassifier> {
        None
    }
}

/// Distance-based classifiers expose `set_distance`/`get_distance`,
/// enabling a `Modifier` (see `tsc_tuner`) to reach the distance kernel
/// through the classifier.
pub trait DistanceBased {
    fn distance_kernel(&self) -> &dyn DistanceKernel;
    fn distance_kernel_mut(&mut self) -> &mut dyn DistanceKernel;
    fn set_distance_kernel(&mut self, kernel: Box<dyn DistanceKernel + Send>);
}

/// Advertises an internal thread count; the evaluator forces this to 1
/// while running inside its own pool to prevent oversubscription.
pub trait Multithreaded {
    fn thread_count(&self) -> usize;
    fn set_thread_count(&mut self, threads: usize);
}

/// Supports `reset()` between folds, clearing any per-run state so a fresh
/// `fit`/`classify` cycle starts clean.
pub trait Resumable {
    fn reset(&mut self);
}

/// Can produce independent instances suitable for parallel use.
pub trait CopyableClassifier: Classifier {
    /// `deep` clones the classifier's internal distance kernel (and any
    /// other referenced sub-component); otherwise the copy shares the
    /// kernel while keeping its own memo.
    fn copy_classifier(&self, deep: bool) -> Box<dyn Classifier + Send>;
}
