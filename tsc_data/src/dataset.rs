//! An ordered collection of [`TimeSeries`], plus the stratified/random
//! splitting operations the resampling evaluators build on.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::error::{DataError, Result};
use crate::time_series::TimeSeries;

/// Ordered sequence of time series. Series are reference-counted so that
/// splits produced by [`Dataset::split`]/[`Dataset::divide`] share the
/// underlying series with the original dataset instead of deep-copying it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    series: Vec<Arc<TimeSeries>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self { series: Vec::new() }
    }

    pub fn from_series(series: Vec<TimeSeries>) -> Self {
        Self {
            series: series.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn push(&mut self, series: TimeSeries) {
        self.series.push(Arc::new(series));
    }

    pub fn push_shared(&mut self, series: Arc<TimeSeries>) {
        self.series.push(series);
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&TimeSeries> {
        self.series.get(i).map(AsRef::as_ref)
    }

    pub fn get_shared(&self, i: usize) -> Option<Arc<TimeSeries>> {
        self.series.get(i).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeSeries> {
        self.series.iter().map(AsRef::as_ref)
    }

    pub fn iter_shared(&self) -> impl Iterator<Item = &Arc<TimeSeries>> {
        self.series.iter()
    }

    /// A new dataset with every series except the one at `index`, sharing
    /// the remaining series with `self`. Used by Leave-One-Out to build a
    /// per-fold trainset without mutating the shared dataset.
    pub fn without_index(&self, index: usize) -> Dataset {
        let series = self
            .series
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, s)| Arc::clone(s))
            .collect();
        Dataset { series }
    }

    /// Distinct labels in first-occurrence order.
    pub fn distinct_labels(&self) -> Vec<f64> {
        let mut labels = Vec::new();
        for s in &self.series {
            let l = s.label();
            if !labels.contains(&l) {
                labels.push(l);
            }
        }
        labels
    }

    /// Group series by label, preserving first-occurrence label order.
    /// When `rng` is given, the members of each group are shuffled
    /// (the grouping itself — which series belongs to which label — never
    /// changes).
    pub fn subsets_by_label(&self, mut rng: Option<&mut SmallRng>) -> Vec<(f64, Dataset)> {
        let labels = self.distinct_labels();
        labels
            .into_iter()
            .map(|label| {
                let mut members: Vec<Arc<TimeSeries>> = self
                    .series
                    .iter()
                    .filter(|s| s.label() == label)
                    .cloned()
                    .collect();
                if let Some(rng) = rng.as_deref_mut() {
                    members.shuffle(rng);
                }
                (label, Dataset { series: members })
            })
            .collect()
    }

    /// Split into `k` folds. When `stratified`, each label's members are
    /// distributed round-robin across folds so that per-label counts (and
    /// therefore fold sizes) differ by at most one. When `rng` is present,
    /// members are shuffled before distribution so the assignment is not
    /// simply dataset order.
    pub fn split(
        &self,
        k: usize,
        stratified: bool,
        mut rng: Option<&mut SmallRng>,
    ) -> Result<Vec<Dataset>> {
        if k < 2 {
            return Err(DataError::InvalidParameter(format!(
                "folds must be >= 2, got {k}"
            )));
        }
        if self.is_empty() {
            return Err(DataError::EmptyDataset);
        }

        let mut folds: Vec<Vec<Arc<TimeSeries>>> = vec![Vec::new(); k];

        if stratified {
            for (_, group) in self.subsets_by_label(rng.as_deref_mut()) {
                for (i, s) in group.series.into_iter().enumerate() {
                    folds[i % k].push(s);
                }
            }
        } else {
            let mut members: Vec<Arc<TimeSeries>> = self.series.clone();
            if let Some(rng) = rng.as_deref_mut() {
                members.shuffle(rng);
            }
            for (i, s) in members.into_iter().enumerate() {
                folds[i % k].push(s);
            }
        }

        Ok(folds.into_iter().map(|series| Dataset { series }).collect())
    }

    /// Split into two parts: the first containing `percentage` of the
    /// dataset, the second the remainder. When `stratified` is set, each
    /// label group contributes its own rounded share toward a global quota.
    pub fn divide(
        &self,
        percentage: f64,
        stratified: bool,
        mut rng: Option<&mut SmallRng>,
    ) -> Result<(Dataset, Dataset)> {
        if !(0.0..=100.0).contains(&percentage) {
            return Err(DataError::InvalidParameter(format!(
                "percentage must be in [0, 100], got {percentage}"
            )));
        }
        if self.is_empty() {
            return Err(DataError::EmptyDataset);
        }

        let n = self.len();
        let quota = ((n as f64) * percentage / 100.0).round() as usize;

        let mut first = Vec::with_capacity(quota);
        let mut second = Vec::with_capacity(n - quota.min(n));

        if stratified {
            let mut taken_total = 0usize;
            for (_, group) in self.subsets_by_label(rng.as_deref_mut()) {
                let group_len = group.len();
                let want = ((group_len as f64) * percentage / 100.0).round() as usize;
                let remaining_quota = quota.saturating_sub(taken_total);
                let take = want.min(remaining_quota).min(group_len);
                taken_total += take;
                for (i, s) in group.series.into_iter().enumerate() {
                    if i < take {
                        first.push(s);
                    } else {
                        second.push(s);
                    }
                }
            }
        } else {
            let mut members: Vec<Arc<TimeSeries>> = self.series.clone();
            if let Some(rng) = rng.as_deref_mut() {
                members.shuffle(rng);
            }
            for (i, s) in members.into_iter().enumerate() {
                if i < quota {
                    first.push(s);
                } else {
                    second.push(s);
                }
            }
        }

        Ok((Dataset { series: first }, Dataset { series: second }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_point::DataPoint;
    use rand::SeedableRng;

    fn labelled_dataset(n_per_label: usize, n_labels: i32) -> Dataset {
        let mut ds = Dataset::new();
        for label in 0..n_labels {
            for i in 0..n_per_label {
                let mut ts = TimeSeries::from_points(vec![DataPoint::new(0.0, i as f64)]);
                ts.set_label(label as f64);
                ds.push(ts);
            }
        }
        ds
    }

    #[test]
    fn distinct_labels_preserve_first_occurrence() {
        let ds = labelled_dataset(2, 3);
        assert_eq!(ds.distinct_labels(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn divide_boundary_percentages() {
        let ds = labelled_dataset(5, 2);
        let (train, test) = ds.divide(0.0, false, None).unwrap();
        assert_eq!(train.len(), 0);
        assert_eq!(test.len(), ds.len());

        let (train, test) = ds.divide(100.0, false, None).unwrap();
        assert_eq!(train.len(), ds.len());
        assert_eq!(test.len(), 0);
    }

    #[test]
    fn stratified_split_balances_fold_sizes() {
        let ds = labelled_dataset(10, 3);
        let mut rng = SmallRng::seed_from_u64(42);
        let folds = ds.split(3, true, Some(&mut rng)).unwrap();
        let sizes: Vec<usize> = folds.iter().map(Dataset::len).collect();
        let max = *sizes.iter().max().unwrap();
        let min = *sizes.iter().min().unwrap();
        assert!(max - min <= 1);

        for label in ds.distinct_labels() {
            let counts: Vec<usize> = folds
                .iter()
                .map(|f| f.iter().filter(|s| s.label() == label).count())
                .collect();
            let max = *counts.iter().max().unwrap();
            let min = *counts.iter().min().unwrap();
            assert!(max - min <= 1);
        }
    }

    #[test]
    fn without_index_drops_exactly_one_series() {
        let ds = labelled_dataset(3, 1);
        let trainset = ds.without_index(1);
        assert_eq!(trainset.len(), ds.len() - 1);
    }

    #[test]
    fn split_rejects_k_below_two() {
        let ds = labelled_dataset(2, 1);
        assert!(ds.split(1, false, None).is_err());
    }

    #[test]
    fn split_rejects_empty_dataset() {
        let ds = Dataset::new();
        assert!(ds.split(2, false, None).is_err());
        assert!(ds.divide(50.0, false, None).is_err());
    }
}
