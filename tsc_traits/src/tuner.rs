//! The hyperparameter tuner capability: a callable `tune(classifier,
//! dataset) -> expected_error` that optionally delegates to a sub-tuner,
//! terminating in an evaluator.

use tsc_data::Dataset;

use crate::classifier::Classifier;
use crate::error::Result;
use crate::param::ParamValue;

pub trait Tuner: Send {
    /// Sweep this tuner's parameter (and any chained sub-tuner's), leaving
    /// `classifier` configured with the winning full parameter vector.
    /// Returns the best (training-set) expected error observed.
    fn tune(&mut self, classifier: &mut dyn Classifier, dataset: &Dataset) -> Result<f64>;

    /// The winning parameter vector from the most recent `tune` call, one
    /// entry per tuner in the chain.
    fn get_parameters(&self) -> Vec<ParamValue>;

    /// Write an explicit parameter vector into `classifier` without
    /// running a sweep (used to replay the winning configuration).
    fn set_parameters(&mut self, classifier: &mut dyn Classifier, params: &[ParamValue]) -> Result<()>;

    /// Whether writing this tuner's parameter into the classifier
    /// invalidates the classifier's distance memo.
    fn affects_distance(&self) -> bool;

    fn as_resumable_mut(&mut self) -> Option<&mut dyn crate::classifier::Resumable> {
        None
    }

    fn as_copyable(&self) -> Option<&dyn CopyableTuner> {
        None
    }
}

pub trait CopyableTuner: Tuner {
    fn copy_tuner(&self, deep: bool) -> Box<dyn Tuner + Send>;
}
