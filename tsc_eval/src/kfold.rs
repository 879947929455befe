//! k-fold cross-validation: the dataset is partitioned into `k` folds
//! once per run, each fold taking a turn as the testset against the
//! concatenation of the rest.

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

/// `k`-fold cross-validation, optionally repeated once per seed. Each
/// repetition's folds are cut once, up front, and held for the duration
/// of that repetition's `k` scoring tasks.
pub struct KFoldCv {
    k: usize,
    seeds: Option<Vec<i64>>,
    stratified: bool,
    threads: usize,
    progress: FoldProgress,
    cancellation: CancellationToken,
    reporter: ProgressReporter,
    folds_cache: Vec<Option<Vec<Dataset>>>,
}

impl KFoldCv {
    pub fn new(k: usize, seeds: Option<Vec<i64>>, stratified: bool, threads: usize) -> Result<Self> {
        if k < 2 {
            return Err(CoreError::InvalidParameter(format!("folds must be >= 2, got {k}")));
        }
        let runs = seeds.as_ref().map(|s| s.len()).unwrap_or(1);
        Ok(Self {
            k,
            seeds,
            stratified,
            threads: threads.max(1),
            progress: FoldProgress::default(),
            cancellation: CancellationToken::new(),
            reporter: ProgressReporter::default(),
            folds_cache: vec![None; runs],
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
        let n = self.runs() * self.k;
        if self.progress.len() != n {
            self.progress = FoldProgress::new(n);
        }
        if self.folds_cache.len() != self.runs() {
            self.folds_cache = vec![None; self.runs()];
        }
    }

    /// Cuts every run's folds that are not already cached, before any
    /// parallel dispatch so concurrent tasks never race on the cut.
    fn ensure_folds(&mut self, dataset: &Dataset) -> Result<()> {
        for run in 0..self.runs() {
            if self.folds_cache[run].is_none() {
                let mut rng = self.rng_for_run(run);
                let folds = dataset.split(self.k, self.stratified, rng.as_mut())?;
                self.folds_cache[run] = Some(folds);
            }
        }
        Ok(())
    }

    fn trainset_for(folds: &[Dataset], held_out: usize) -> Dataset {
        let mut trainset = Dataset::new();
        for (i, fold) in folds.iter().enumerate() {
            if i != held_out {
                for series in fold.iter_shared() {
                    trainset.push_shared(Arc::clone(series));
                }
            }
        }
        trainset
    }

    fn eligible_for_parallel(&self, tuner: &Option<&mut dyn Tuner>, classifier: &dyn Classifier) -> bool {
        self.threads > 1
            && self.runs() * self.k > 1
            && classifier.as_copyable().is_some()
            && tuner.as_ref().map(|t| t.as_copyable().is_some()).unwrap_or(true)
    }

    fn evaluate_sequential(
        &mut self,
        mut tuner: Option<&mut dyn Tuner>,
        classifier: &mut dyn Classifier,
        dataset: &Dataset,
    ) -> Result<f64> {
        for task in self.progress.remaining() {
            self.cancellation.check()?;
            let run = task / self.k;
            let held_out = task % self.k;
            let folds = self.folds_cache[run]
                .as_ref()
                .expect("ensure_folds cut every run before evaluate_sequential runs");
            let testset = folds[held_out].clone();
            let trainset = Self::trainset_for(folds, held_out);

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
            self.progress.record(task, fold);
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
            .map(|((task, classifier), tuner)| (task, classifier, tuner))
            .collect();

        let k = self.k;
        let folds_cache = self.folds_cache.clone();
        let cancellation = self.cancellation.clone();
        let pool = WorkerPool::new(self.threads);

        let results = pool.map(jobs, move |_, (task, mut classifier, mut tuner)| {
            let tuner_ref: Option<&mut dyn Tuner> = match tuner.as_deref_mut() {
                Some(t) => {
                    let t: &mut dyn Tuner = t;
                    Some(t)
                }
                None => None,
            };
            let run = task / k;
            let held_out = task % k;
            let folds = folds_cache[run]
                .as_ref()
                .expect("ensure_folds cut every run before dispatch");
            run_fold(&cancellation, folds, task, held_out, classifier.as_mut(), tuner_ref)
        });
        pool.shutdown();

        let mut first_err = None;
        for result in results {
            match result {
                Ok((task, fold)) => {
                    self.progress.record(task, fold);
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
fn run_fold(
    cancellation: &CancellationToken,
    folds: &[Dataset],
    task: usize,
    held_out: usize,
    classifier: &mut dyn Classifier,
    mut tuner: Option<&mut dyn Tuner>,
) -> Result<(usize, FoldResult)> {
    cancellation.check()?;
    let testset = folds[held_out].clone();
    let trainset = KFoldCv::trainset_for(folds, held_out);

    let outcome = (|| -> Result<(f64, Vec<tsc_traits::param::ParamValue>, usize)> {
        let expected_error = match tuner.as_mut() {
            Some(t) => t.tune(classifier, &trainset)?,
            None => 0.0,
        };
        let best_params = tuner.as_ref().map(|t| t.get_parameters()).unwrap_or_default();
        classifier.fit(&trainset)?;

        let mut misclassified = 0usize;
        for series in testset.iter_shared() {
            cancellation.check()?;
            let predicted = classifier.classify(series)?;
            if predicted != series.label() {
                misclassified += 1;
            }
        }
        Ok((expected_error, best_params, misclassified))
    })();

    let (expected_error, best_params, misclassified) = match outcome {
        Ok(v) => v,
        Err(e) => {
            cancellation.cancel();
            return Err(e);
        }
    };

    Ok((
        task,
        FoldResult::new(trainset, testset, misclassified, expected_error, best_params),
    ))
}

impl Evaluator for KFoldCv {
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
        self.ensure_folds(dataset)?;
        self.progress.begin();
        self.reporter
            .begin((self.runs() * self.k) as u64, self.progress.completed() as u64);

        if let Err(e) = self.cancellation.check() {
            return Err(e);
        }

        let parallel = self.eligible_for_parallel(&tuner, classifier);
        let result = if parallel {
            self.evaluate_parallel(tuner, classifier)
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
        self.folds_cache = vec![None; self.runs()];
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

impl CopyableEvaluator for KFoldCv {
    fn copy_evaluator(&self) -> Box<dyn Evaluator + Send> {
        Box::new(KFoldCv {
            k: self.k,
            seeds: self.seeds.clone(),
            stratified: self.stratified,
            threads: self.threads,
            progress: FoldProgress::default(),
            cancellation: CancellationToken::new(),
            reporter: self.reporter.clone(),
            folds_cache: vec![None; self.runs()],
        })
    }
}
