//! Copy-on-write helpers for the parallel tune/classify paths: making `T`
//! independent (tuner, classifier) pairs for a parallel candidate sweep or
//! fold sweep, deep-copying the classifier only when something in the
//! chain flows through the distance kernel.

use tsc_traits::classifier::{Classifier, CopyableClassifier};
use tsc_traits::tuner::{CopyableTuner, Tuner};

/// `n` independent classifier copies. `deep` should be `true` whenever any
/// tuner in the chain reports `affects_distance() == true` — otherwise the
/// copies may safely share the original's distance kernel, each with its
/// own memo.
pub fn fan_out_classifier(
    classifier: &dyn CopyableClassifier,
    deep: bool,
    n: usize,
) -> Vec<Box<dyn Classifier + Send>> {
    (0..n).map(|_| classifier.copy_classifier(deep)).collect()
}

pub fn fan_out_tuner(tuner: &dyn CopyableTuner, deep: bool, n: usize) -> Vec<Box<dyn Tuner + Send>> {
    (0..n).map(|_| tuner.copy_tuner(deep)).collect()
}
