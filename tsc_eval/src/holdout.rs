//! Holdout: one or more percentage-split (train, test) runs, each
//! optionally reshuffled by a per-run seed.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use tsc_data::Dataset;
use tsc_executor::{CancellationToken, WorkerPool, fan_out_classifier, fan_out_tuner};
use tsc_traits::Callback;
use tsc_traits::classifier::Classifier;
use tsc_traits::error::{CoreError, Result};
use tsc_traits::evaluator::{CopyableEvaluator, Evaluator, FoldResult};
use tsc_traits::tuner::Tuner;

use crate::progress::ProgressReporter;
use crate::state::FoldProgress;

/// One percentage-split resampling run per seed (or a single unseeded
/// run when `seeds` is absent).
pub struct Holdout {
    percentage: f64,
    seeds: Option<Vec<i64>>,
    stratified: bool,
    threads: usize,
    progress: FoldProgress,
    cancellation: CancellationToken,
    reporter: ProgressReporter,
}

impl Holdout {
    pub fn new(percentage: f64, seeds: Option<Vec<i64>>, stratified: bool, threads: usize) -> Result<Self> {
        if !(0.0..=100.0).contains(&percentage) {
            return Err(CoreError::InvalidParameter(format!(
                "percentage must be in [0, 100], got {percentage}"
            )));
        }
        Ok(Self {
            percentage,
            seeds,
            stratified,
            threads: threads.max(1),
            progress: FoldProgress::default(),
            cancellation: CancellationToken::new(),
            reporter: ProgressReporter::default(),
        })
    }

    pub fn with_callback(mut self, callback: Arc<dyn Callback>) -> Self {
        self.reporter = ProgressReporter::new(Some(callback));
        self
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    fn runs(&self) -> usize {
        self.seeds.as_ref().map(|s| s.len()).unwrap_or(1)
    }

    fn rng_for_run(&self, run: usize) -> Option<SmallRng> {
        self.seeds.as_ref().map(|seeds| SmallRng::seed_from_u64(seeds[run] as u64))
    }

    fn ensure_progress(&mut self) {
        let n = self.runs();
        if self.progress.len() != n {
            self.progress = FoldProgress::new(n);
        }
    }

    fn eligible_for_parallel(&self, tuner: &Option<&mut dyn Tuner>, classifier: &dyn Classifier) -> bool {
        self.threads > 1
            && self.runs() > 1
            && classifier.as_copyable().is_some()
            && tuner.as_ref().map(|t| t.as_copyable().is_some()).unwrap_or(true)
    }

    fn evaluate_sequential(
        &mut self,
        mut tuner: Option<&mut dyn Tuner>,
        classifier: &mut dyn Classifier,
        dataset: &Dataset,
    ) -> Result<f64> {
        for run in self.progress.remaining() {
            self.cancellation.check()?;
            let mut rng = self.rng_for_run(run);
            let (trainset, testset) = dataset.divide(self.percentage, self.stratified, rng.as_mut())?;

            let expected_error = match tuner.as_mut() {
                Some(t) => t.tune(classifier, &trainset)?,
                None => 0.0,
            };
            let best_params = tuner.as_ref().map(|t| t.get_parameters()).unwrap_or_default();
            classifier.fit(&trainset)?;

            let mut misclassified = 0usize;
            for series in testset.iter_shared() {
                self.cancellation.check()?;
                let predicted = classifier.classify(series)?;
                if predicted != series.label() {
                    misclassified += 1;
                }
            }

            let fold = FoldResult::new(trainset, testset, misclassified, expected_error, best_params);
            self.progress.record(run, fold);
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
            .map(|((run, classifier), tuner)| (run, classifier, tuner))
            .collect();

        let dataset = dataset.clone();
        let cancellation = self.cancellation.clone();
        let percentage = self.percentage;
        let stratified = self.stratified;
        let seeds = self.seeds.clone();
        let pool = WorkerPool::new(self.threads);

        let results = pool.map(jobs, move |_, (run, mut classifier, mut tuner)| {
            let tuner_ref: Option<&mut dyn Tuner> = match tuner.as_deref_mut() {
                Some(t) => {
                    let t: &mut dyn Tuner = t;
                    Some(t)
                }
                None => None,
            };
            let mut rng = seeds.as_ref().map(|s| SmallRng::seed_from_u64(s[run] as u64));
            run_split(
                &cancellation,
                &dataset,
                percentage,
                stratified,
                rng.as_mut(),
                run,
                classifier.as_mut(),
                tuner_ref,
            )
        });
        pool.shutdown();

        let mut first_err = None;
        for result in results {
            match result {
                Ok((run, fold)) => {
                    self.progress.record(run, fold);
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

#[allow(clippy::too_many_arguments)]
fn run_split(
    cancellation: &CancellationToken,
    dataset: &Dataset,
    percentage: f64,
    stratified: bool,
    rng: Option<&mut SmallRng>,
    run: usize,
    classifier: &mut dyn Classifier,
    mut tuner: Option<&mut dyn Tuner>,
) -> Result<(usize, FoldResult)> {
    cancellation.check()?;
    let (trainset, testset) = dataset.divide(percentage, stratified, rng)?;

    let expected_error = match tuner.as_mut() {
        Some(t) => t.tune(classifier, &trainset).map_err(|e| {
            cancellation.cancel();
            e
        })?,
        None => 0.0,
    };
    let best_params = tuner.as_ref().map(|t| t.get_parameters()).unwrap_or_default();
    classifier.fit(&trainset).map_err(|e| {
        cancellation.cancel();
        e
    })?;

    let mut misclassified = 0usize;
    for series in testset.iter_shared() {
        if let Err(e) = cancellation.check() {
            return Err(e);
        }
        let predicted = classifier.classify(series).map_err(|e| {
            cancellation.cancel();
            e
        })?;
        if predicted != series.label() {
            misclassified += 1;
        }
    }

    Ok((
        run,
        FoldResult::new(trainset, testset, misclassified, expected_error, best_params),
    ))
}

impl Evaluator for Holdout {
    fn evaluate(
        &mut self,
        tuner: Option<&mut dyn Tuner>,
        classifier: &mut dyn Classifier,
        dataset: &Dataset,
    ) -> Result<f64> {
        if dataset.is_empty() {
            return Err(CoreError::EmptyDataset);
        }
        self.ensure_progress();
        self.progress.begin();
        self.reporter.begin(self.runs() as u64, self.progress.completed() as u64);

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

impl CopyableEvaluator for Holdout {
    fn copy_evaluator(&self) -> Box<dyn Evaluator + Send> {
        Box::new(Holdout {
            percentage: self.percentage,
            seeds: self.seeds.clone(),
            stratified: self.stratified,
            threads: self.threads,
            progress: FoldProgress::default(),
            cancellation: CancellationToken::new(),
            reporter: self.reporter.clone(),
        })
    }
}
