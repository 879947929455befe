//! Leave-One-Out: every series in turn is the lone test item, the
//! remainder of the dataset is the trainset.

use std::sync::Arc;

use tsc_data::Dataset;
use tsc_executor::{CancellationToken, WorkerPool, fan_out_classifier, fan_out_tuner};
use tsc_traits::Callback;
use tsc_traits::classifier::Classifier;
use tsc_traits::error::{CoreError, Result};
use tsc_traits::evaluator::{CopyableEvaluator, Evaluator, FoldResult};
use tsc_traits::tuner::Tuner;

use crate::progress::ProgressReporter;
use crate::state::FoldProgress;

/// Leave-One-Out resampling: `n` folds for an `n`-series dataset, each
/// testing on a single held-out series.
pub struct LeaveOneOut {
    threads: usize,
    progress: FoldProgress,
    cancellation: CancellationToken,
    reporter: ProgressReporter,
}

impl LeaveOneOut {
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            progress: FoldProgress::default(),
            cancellation: CancellationToken::new(),
            reporter: ProgressReporter::default(),
        }
    }

    pub fn with_callback(mut self, callback: Arc<dyn Callback>) -> Self {
        self.reporter = ProgressReporter::new(Some(callback));
        self
    }

    /// A handle that can be used to cancel an in-flight `evaluate` call
    /// from another thread.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    fn ensure_progress(&mut self, n: usize) {
        if self.progress.len() != n {
            self.progress = FoldProgress::new(n);
        }
    }

    fn eligible_for_parallel(&self, tuner: &Option<&mut dyn Tuner>, classifier: &dyn Classifier) -> bool {
        self.threads > 1
            && classifier.as_copyable().is_some()
            && tuner.as_ref().map(|t| t.as_copyable().is_some()).unwrap_or(true)
    }

    fn evaluate_sequential(
        &mut self,
        mut tuner: Option<&mut dyn Tuner>,
        classifier: &mut dyn Classifier,
        dataset: &Dataset,
    ) -> Result<f64> {
        for index in self.progress.remaining() {
            self.cancellation.check()?;

            let trainset = dataset.without_index(index);
            let series = dataset
                .get_shared(index)
                .expect("index came from this dataset's remaining set");
            let true_label = series.label();

            let expected_error = match tuner.as_mut() {
                Some(t) => t.tune(classifier, &trainset)?,
                None => 0.0,
            };
            let best_params = tuner.as_ref().map(|t| t.get_parameters()).unwrap_or_default();

            classifier.fit(&trainset)?;
            self.cancellation.check()?;
            let predicted = classifier.classify(&series)?;
            let misclassified = usize::from(predicted != true_label);

            let mut testset = Dataset::new();
            testset.push_shared(series);
            let fold = FoldResult::new(trainset, testset, misclassified, expected_error, best_params);
            self.progress.record(index, fold);
            self.reporter.tick(self);

            if let Some(t) = tuner.as_mut() {
                if let Some(r) = t.as_resumable_mut() {
                    r.reset();
                }
            }
            if let Some(r) = classifier.as_resumable_mut() {
                r.reset();
            }
        }
        Ok(self.progress.error())
    }

    fn evaluate_parallel(
        &mut self,
        tuner: Option<&mut dyn Tuner>,
        classifier: &mut dyn Classifier,
        dataset: &Dataset,
    ) -> Result<f64> {
        let remaining = self.progress.remaining();
        let classifier_copyable = classifier
            .as_copyable()
            .expect("eligible_for_parallel checked as_copyable");
        let deep = tuner.as_ref().map(|t| t.affects_distance()).unwrap_or(false);
        let n = remaining.len();

        let mut classifier_copies = fan_out_classifier(classifier_copyable, deep, n);
        for c in classifier_copies.iter_mut() {
            if let Some(mt) = c.as_multithreaded_mut() {
                mt.set_thread_count(1);
            }
        }

        let mut tuner_copies: Vec<Option<Box<dyn Tuner + Send>>> = match tuner {
            Some(t) => {
                let copyable = t.as_copyable().expect("eligible_for_parallel checked tuner");
                fan_out_tuner(copyable, deep, n).into_iter().map(Some).collect()
            }
            None => (0..n).map(|_| None).collect(),
        };

        let jobs: Vec<(usize, Box<dyn Classifier + Send>, Option<Box<dyn Tuner + Send>>)> = remaining
            .into_iter()
            .zip(classifier_copies.drain(..))
            .zip(tuner_copies.drain(..))
            .map(|((index, classifier), tuner)| (index, classifier, tuner))
            .collect();

        let dataset = dataset.clone();
        let cancellation = self.cancellation.clone();
        let pool = WorkerPool::new(self.threads);

        let results = pool.map(jobs, move |_, (index, mut classifier, mut tuner)| {
            let tuner_ref: Option<&mut dyn Tuner> = match tuner.as_deref_mut() {
                Some(t) => {
                    let t: &mut dyn Tuner = t;
                    Some(t)
                }
                None => None,
            };
            run_fold(&cancellation, &dataset, index, classifier.as_mut(), tuner_ref)
        });
        pool.shutdown();

        let mut first_err = None;
        for result in results {
            match result {
                Ok((index, fold)) => {
                    self.progress.record(index, fold);
                    self.reporter.tick(self);
                }
                Err(e) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }
        if let Some(e) = first_err {
            return Err(e);
        }
        Ok(self.progress.error())
    }
}

/// One Leave-One-Out fold, shared by the sequential loop (via the
/// original classifier/tuner) and the parallel path (via per-task
/// copies).
fn run_fold(
    cancellation: &CancellationToken,
    dataset: &Dataset,
    index: usize,
    classifier: &mut dyn Classifier,
    mut tuner: Option<&mut dyn Tuner>,
) -> Result<(usize, FoldResult)> {
    cancellation.check()?;
    let trainset = dataset.without_index(index);
    let series = dataset
        .get_shared(index)
        .expect("index came from this dataset's remaining set");
    let true_label = series.label();

    let outcome = (|| -> Result<(f64, Vec<tsc_traits::param::ParamValue>, f64)> {
        let expected_error = match tuner.as_mut() {
            Some(t) => t.tune(classifier, &trainset)?,
            None => 0.0,
        };
        let best_params = tuner.as_ref().map(|t| t.get_parameters()).unwrap_or_default();
        classifier.fit(&trainset)?;
        cancellation.check()?;
        let predicted = classifier.classify(&series)?;
        Ok((expected_error, best_params, predicted))
    })();

    let (expected_error, best_params, predicted) = match outcome {
        Ok(v) => v,
        Err(e) => {
            cancellation.cancel();
            return Err(e);
        }
    };

    let misclassified = usize::from(predicted != true_label);
    let mut testset = Dataset::new();
    testset.push_shared(series);
    Ok((
        index,
        FoldResult::new(trainset, testset, misclassified, expected_error, best_params),
    ))
}

impl Evaluator for LeaveOneOut {
    fn evaluate(
        &mut self,
        tuner: Option<&mut dyn Tuner>,
        classifier: &mut dyn Classifier,
        dataset: &Dataset,
    ) -> Result<f64> {
        if dataset.is_empty() {
            return Err(CoreError::EmptyDataset);
        }
        self.ensure_progress(dataset.len());
        self.progress.begin();
        self.reporter.begin(dataset.len() as u64, self.progress.completed() as u64);

        if let Err(e) = self.cancellation.check() {
            return Err(e);
        }

        let parallel = self.eligible_for_parallel(&tuner, classifier);
        let result = if parallel {
            self.evaluate_parallel(tuner, classifier, dataset)
        } else {
            self.evaluate_sequential(tuner, classifier, dataset)
        };

        if !matches!(result, Err(CoreError::Cancelled)) {
            self.progress.end();
        }
        result
    }

    fn results(&self) -> &[FoldResult] {
        self.progress.results()
    }

    fn misclassified(&self) -> i32 {
        self.progress.misclassified()
    }

    fn reset(&mut self) {
        self.progress.reset();
        self.cancellation.reset();
    }

    fn is_done(&self) -> bool {
        self.progress.is_done()
    }

    fn is_in_progress(&self) -> bool {
        self.progress.in_progress()
    }

    fn as_copyable(&self) -> Option<&dyn CopyableEvaluator> {
        Some(self)
    }
}

impl CopyableEvaluator for LeaveOneOut {
    fn copy_evaluator(&self) -> Box<dyn Evaluator + Send> {
        Box::new(LeaveOneOut::new(self.threads))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsc_data::{DataPoint, SeriesRef, TimeSeries};
    use tsc_traits::classifier::{CopyableClassifier, Resumable};

    /// 1-NN on `y` with a trivial Manhattan-on-the-mean distance, purely
    /// for exercising the evaluator without depending on `tsc_kernels`.
    struct NearestMean {
        means: Vec<(f64, f64)>,
        resets: usize,
    }

    impl NearestMean {
        fn new() -> Self {
            Self {
                means: Vec::new(),
                resets: 0,
            }
        }
    }

    impl Classifier for NearestMean {
        fn fit(&mut self, trainset: &Dataset) -> Result<()> {
            self.means = trainset.iter().map(|s| (s.mean_y(), s.label())).collect();
            Ok(())
        }
        fn classify(&self, series: &SeriesRef) -> Result<f64> {
            let query = series.mean_y();
            self.means
                .iter()
                .min_by(|a, b| (a.0 - query).abs().total_cmp(&(b.0 - query).abs()))
                .map(|(_, label)| *label)
                .ok_or_else(|| CoreError::InvalidParameter("classifier was not fit".into()))
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
        fn as_resumable_mut(&mut self) -> Option<&mut dyn Resumable> {
            Some(self)
        }
        fn as_copyable(&self) -> Option<&dyn CopyableClassifier> {
            Some(self)
        }
    }

    impl Resumable for NearestMean {
        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    impl CopyableClassifier for NearestMean {
        fn copy_classifier(&self, _deep: bool) -> Box<dyn Classifier + Send> {
            Box::new(NearestMean {
                means: self.means.clone(),
                resets: 0,
            })
        }
    }

    fn series_with_label(mean_y: f64, label: f64) -> TimeSeries {
        let mut ts = TimeSeries::from_points(vec![DataPoint::new(0.0, mean_y)]);
        ts.set_label(label);
        ts
    }

    /// Six series, two separable classes ("low" near y=0, "high" near
    /// y=10): spec.md §8 scenario 4.
    fn separable_dataset() -> Dataset {
        Dataset::from_series(vec![
            series_with_label(0.0, 0.0),
            series_with_label(0.2, 0.0),
            series_with_label(0.4, 0.0),
            series_with_label(9.6, 1.0),
            series_with_label(9.8, 1.0),
            series_with_label(10.0, 1.0),
        ])
    }

    #[test]
    fn separable_dataset_is_perfectly_classified() {
        let dataset = separable_dataset();
        let mut classifier = NearestMean::new();
        let mut loo = LeaveOneOut::new(1);
        let err = loo.evaluate(None, &mut classifier, &dataset).unwrap();
        assert_eq!(err, 0.0);
        assert_eq!(loo.misclassified(), 0);
        assert_eq!(loo.results().len(), dataset.len());
        assert!(loo.is_done());
    }

    #[test]
    fn parallel_matches_sequential_on_separable_dataset() {
        let dataset = separable_dataset();
        let mut classifier = NearestMean::new();
        let mut loo = LeaveOneOut::new(4);
        let err = loo.evaluate(None, &mut classifier, &dataset).unwrap();
        assert_eq!(err, 0.0);
        assert_eq!(loo.results().len(), dataset.len());
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let dataset = Dataset::new();
        let mut classifier = NearestMean::new();
        let mut loo = LeaveOneOut::new(1);
        assert!(matches!(
            loo.evaluate(None, &mut classifier, &dataset),
            Err(CoreError::EmptyDataset)
        ));
    }

    #[test]
    fn cancellation_preserves_partial_progress_and_resumes() {
        let dataset = separable_dataset();
        let mut classifier = NearestMean::new();
        let mut loo = LeaveOneOut::new(1);
        let token = loo.cancellation();

        // Cancel before any fold runs; evaluate should observe it immediately.
        token.cancel();
        let err = loo.evaluate(None, &mut classifier, &dataset);
        assert!(matches!(err, Err(CoreError::Cancelled)));
        assert!(!loo.is_done());
        assert!(loo.is_in_progress());
        assert_eq!(loo.results().len(), 0);

        // Re-entry with the flag cleared runs every fold from scratch.
        token.reset();
        let err = loo.evaluate(None, &mut classifier, &dataset).unwrap();
        assert_eq!(err, 0.0);
        assert!(loo.is_done());
        assert!(!loo.is_in_progress());
    }

    #[test]
    fn reset_clears_retained_results() {
        let dataset = separable_dataset();
        let mut classifier = NearestMean::new();
        let mut loo = LeaveOneOut::new(1);
        loo.evaluate(None, &mut classifier, &dataset).unwrap();
        loo.reset();
        assert!(loo.results().is_empty());
        assert!(!loo.is_done());
    }

    #[test]
    fn classifier_is_reset_between_folds() {
        let dataset = separable_dataset();
        let mut classifier = NearestMean::new();
        let mut loo = LeaveOneOut::new(1);
        loo.evaluate(None, &mut classifier, &dataset).unwrap();
        assert_eq!(classifier.resets, dataset.len());
    }
}
