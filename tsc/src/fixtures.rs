//! Test-only reference classifier.
//!
//! This core does not implement a concrete classifier — consumers bring
//! their own. [`NearestNeighborClassifier`] exists purely so this crate's
//! own integration tests can exercise the tuner chain and evaluators
//! end-to-end, standing in for a real classifier the way a minimal mock
//! implementation stands in for a hardware backend. It is not exported
//! as a production recommendation.

use tsc_data::{Dataset, SeriesRef};
use tsc_traits::classifier::{Classifier, CopyableClassifier, DistanceBased, Resumable};
use tsc_traits::error::{CoreError, Result};
use tsc_traits::kernel::DistanceKernel;

/// 1-to-k nearest neighbor over an arbitrary [`DistanceKernel`]. Majority
/// vote among the `k` closest trainset series, ties broken in favor of
/// the closer series (first-seen label among the sorted neighbors wins).
pub struct NearestNeighborClassifier {
    k: usize,
    kernel: Box<dyn DistanceKernel + Send>,
    trainset: Dataset,
}

impl NearestNeighborClassifier {
    pub fn new(k: usize, kernel: Box<dyn DistanceKernel + Send>) -> Self {
        Self {
            k: k.max(1),
            kernel,
            trainset: Dataset::new(),
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn set_k(&mut self, k: usize) {
        self.k = k.max(1);
    }
}

impl Classifier for NearestNeighborClassifier {
    fn fit(&mut self, trainset: &Dataset) -> Result<()> {
        self.trainset = trainset.clone();
        Ok(())
    }

    fn classify(&self, series: &SeriesRef) -> Result<f64> {
        if self.trainset.is_empty() {
            return Err(CoreError::InvalidParameter("classifier was not fit".into()));
        }

        let mut neighbors: Vec<(f64, f64)> = Vec::with_capacity(self.trainset.len());
        for candidate in self.trainset.iter_shared() {
            let distance = self.kernel.distance(series, candidate)?;
            neighbors.push((distance, candidate.label()));
        }
        neighbors.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut votes: Vec<(f64, usize)> = Vec::new();
        for (_, label) in neighbors.into_iter().take(self.k.min(self.trainset.len())) {
            match votes.iter_mut().find(|(l, _)| *l == label) {
                Some((_, count)) => *count += 1,
                None => votes.push((label, 1)),
            }
        }

        let mut winner: Option<(f64, usize)> = None;
        for (label, count) in votes {
            match winner {
                Some((_, best_count)) if count <= best_count => {}
                _ => winner = Some((label, count)),
            }
        }
        winner
            .map(|(label, _)| label)
            .ok_or_else(|| CoreError::InvalidParameter("classifier was not fit".into()))
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn as_distance_based(&self) -> Option<&dyn DistanceBased> {
        Some(self)
    }

    fn as_distance_based_mut(&mut self) -> Option<&mut dyn DistanceBased> {
        Some(self)
    }

    fn as_resumable_mut(&mut self) -> Option<&mut dyn Resumable> {
        Some(self)
    }

    fn as_copyable(&self) -> Option<&dyn CopyableClassifier> {
        Some(self)
    }
}

impl DistanceBased for NearestNeighborClassifier {
    fn distance_kernel(&self) -> &dyn DistanceKernel {
        self.kernel.as_ref()
    }

    fn distance_kernel_mut(&mut self) -> &mut dyn DistanceKernel {
        self.kernel.as_mut()
    }

    fn set_distance_kernel(&mut self, kernel: Box<dyn DistanceKernel + Send>) {
        self.kernel = kernel;
    }
}

/// Folds only carry trainset state through `fit`, but the distance
/// kernel's memo is keyed by series identity and would otherwise grow
/// unbounded across folds.
impl Resumable for NearestNeighborClassifier {
    fn reset(&mut self) {
        self.kernel.clear_storage();
    }
}

impl CopyableClassifier for NearestNeighborClassifier {
    fn copy_classifier(&self, deep: bool) -> Box<dyn Classifier + Send> {
        Box::new(NearestNeighborClassifier {
            k: self.k,
            kernel: self.kernel.make_copy(deep),
            trainset: self.trainset.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tsc_data::{DataPoint, TimeSeries};
    use tsc_kernels::DtwKernel;

    fn series(mean_y: f64, label: f64) -> TimeSeries {
        let mut ts = TimeSeries::from_points(vec![DataPoint::new(0.0, mean_y)]);
        ts.set_label(label);
        ts
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    fn majority_vote_among_k_nearest(#[case] k: usize) {
        let mut nn = NearestNeighborClassifier::new(k, Box::new(DtwKernel::new(false)));
        let trainset = Dataset::from_series(vec![
            series(0.0, 0.0),
            series(0.1, 0.0),
            series(0.2, 1.0),
            series(10.0, 1.0),
        ]);
        nn.fit(&trainset).unwrap();
        let query = Dataset::from_series(vec![series(0.05, 0.0)]).get_shared(0).unwrap();
        assert_eq!(nn.classify(&query).unwrap(), 0.0);
    }

    #[test]
    fn classifying_before_fit_is_rejected() {
        let nn = NearestNeighborClassifier::new(1, Box::new(DtwKernel::new(false)));
        let query = Dataset::from_series(vec![series(0.0, 0.0)]).get_shared(0).unwrap();
        assert!(nn.classify(&query).is_err());
    }

    #[test]
    fn copy_classifier_shares_trainset_but_not_kernel_memo() {
        let mut nn = NearestNeighborClassifier::new(1, Box::new(DtwKernel::new(true)));
        let trainset = Dataset::from_series(vec![series(0.0, 0.0), series(10.0, 1.0)]);
        nn.fit(&trainset).unwrap();
        let query = Dataset::from_series(vec![series(0.2, 0.0)]).get_shared(0).unwrap();
        nn.classify(&query).unwrap();

        let copy = nn.as_copyable().unwrap().copy_classifier(false);
        assert!(copy.as_distance_based().unwrap().distance_kernel().is_storing());
    }
}
