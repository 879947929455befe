//! A single-parameter link in the tuner chain: sweeps one ordered set of
//! candidate values, delegating each candidate either to a subtuner (the
//! next parameter) or, at the chain's terminal link, to an evaluator.

use std::sync::Arc;

use tsc_data::Dataset;
use tsc_executor::{WorkerPool, fan_out_classifier, fan_out_tuner};
use tsc_traits::classifier::{Classifier, CopyableClassifier, Resumable};
use tsc_traits::error::{CoreError, Result};
use tsc_traits::evaluator::Evaluator;
use tsc_traits::param::ParamValue;
use tsc_traits::tuner::{CopyableTuner, Tuner};

use crate::modifier::Modifier;

/// What a [`GridTuner`] delegates to after writing its own candidate value.
enum Next {
    Sub(Box<dyn Tuner + Send>),
    Terminal(Box<dyn Evaluator + Send>),
}

/// One link in the tuner chain, sweeping `values` through `modifier` and
/// scoring each candidate via `next` (a subtuner or a terminal evaluator).
///
/// Grid search over a single parameter's candidate set, not over a
/// cross-product of several — the cross-product falls out of chaining
/// `GridTuner`s, one per parameter, via `subtuner`.
pub struct GridTuner {
    values: Vec<ParamValue>,
    modifier: Arc<dyn Modifier>,
    next: Next,
    best_index: Option<usize>,
    best_err: f64,
    /// `[winning value] ++ subtuner.get_parameters()` captured at the
    /// moment `best_index` last improved — *not* re-derived from the
    /// subtuner's live state, which after the loop reflects whichever
    /// candidate was evaluated last, not necessarily the winner.
    best_params: Vec<ParamValue>,
    threads: usize,
}

impl GridTuner {
    /// A terminal tuner: the last link in the chain, scoring each candidate
    /// directly with `evaluator`.
    pub fn terminal(
        values: Vec<ParamValue>,
        modifier: Arc<dyn Modifier>,
        evaluator: Box<dyn Evaluator + Send>,
        threads: usize,
    ) -> Self {
        Self {
            values,
            modifier,
            next: Next::Terminal(evaluator),
            best_index: None,
            best_err: f64::INFINITY,
            best_params: Vec::new(),
            threads,
        }
    }

    /// A non-terminal tuner delegating to `subtuner` for the next
    /// parameter.
    pub fn chained(
        values: Vec<ParamValue>,
        modifier: Arc<dyn Modifier>,
        subtuner: Box<dyn Tuner + Send>,
        threads: usize,
    ) -> Self {
        Self {
            values,
            modifier,
            next: Next::Sub(subtuner),
            best_index: None,
            best_err: f64::INFINITY,
            best_params: Vec::new(),
            threads,
        }
    }

    fn affects_distance_chain(&self) -> bool {
        self.modifier.affects_distance()
            || match &self.next {
                Next::Sub(sub) => sub.affects_distance(),
                Next::Terminal(_) => false,
            }
    }

    fn parallel_eligible(&self, classifier: &dyn Classifier) -> bool {
        if self.threads <= 1 || self.values.len() <= 1 {
            return false;
        }
        if classifier.as_copyable().is_none() {
            return false;
        }
        match &self.next {
            Next::Terminal(evaluator) => evaluator.as_copyable().is_some(),
            Next::Sub(sub) => sub.as_copyable().is_some(),
        }
    }

    /// Scores one candidate and returns its error alongside the full
    /// parameter suffix (`next`'s winning sub-parameters, if any) that
    /// produced it — captured before `next` is reset, since the reset
    /// (when `next` is a Resumable evaluator) clears the state that
    /// suffix was read from.
    fn evaluate_candidate(
        next: &mut Next,
        classifier: &mut dyn Classifier,
        dataset: &Dataset,
    ) -> Result<(f64, Vec<ParamValue>)> {
        let err = match next {
            Next::Sub(sub) => sub.tune(classifier, dataset)?,
            Next::Terminal(evaluator) => evaluator.evaluate(None, classifier, dataset)?,
        };
        let params = Self::params_for_next(next);
        match next {
            Next::Sub(sub) => {
                if let Some(resumable) = sub.as_resumable_mut() {
                    resumable.reset();
                }
            }
            Next::Terminal(evaluator) => evaluator.reset(),
        }
        Ok((err, params))
    }

    /// `sub.get_parameters()` if `next` delegates further, else empty —
    /// the suffix to append after this link's own winning value.
    fn params_for_next(next: &Next) -> Vec<ParamValue> {
        match next {
            Next::Sub(sub) => sub.get_parameters(),
            Next::Terminal(_) => Vec::new(),
        }
    }

    fn tune_sequential(&mut self, classifier: &mut dyn Classifier, dataset: &Dataset) -> Result<f64> {
        self.best_index = None;
        self.best_err = f64::INFINITY;
        self.best_params = Vec::new();

        for (index, value) in self.values.iter().enumerate() {
            self.modifier.set(classifier, value)?;
            let (err, sub_params) = Self::evaluate_candidate(&mut self.next, classifier, dataset)?;
            if err < self.best_err {
                self.best_err = err;
                self.best_index = Some(index);
                let mut params = vec![value.clone()];
                params.extend(sub_params);
                self.best_params = params;
            }
            if let Some(resumable) = classifier.as_resumable_mut() {
                resumable.reset();
            }
        }

        self.replay_best(classifier)?;
        Ok(self.best_err)
    }

    fn tune_parallel(&mut self, classifier: &mut dyn Classifier, dataset: &Dataset) -> Result<f64> {
        self.best_index = None;
        self.best_err = f64::INFINITY;
        self.best_params = Vec::new();

        let copyable = classifier
            .as_copyable()
            .expect("parallel_eligible checked as_copyable");
        let deep = self.affects_distance_chain();
        let n = self.values.len();

        let mut classifier_copies = fan_out_classifier(copyable, deep, n);
        // Copies are discarded after scoring, never handed back to the
        // caller, so suppressing here needs no matching restore.
        for c in classifier_copies.iter_mut() {
            if let Some(mt) = c.as_multithreaded_mut() {
                mt.set_thread_count(1);
            }
        }

        let mut next_copies: Vec<Next> = match &self.next {
            Next::Sub(sub) => {
                let sub_copyable = sub.as_copyable().expect("parallel_eligible checked subtuner");
                fan_out_tuner(sub_copyable, deep, n)
                    .into_iter()
                    .map(Next::Sub)
                    .collect()
            }
            Next::Terminal(evaluator) => {
                let copyable = evaluator
                    .as_copyable()
                    .expect("parallel_eligible checked terminal evaluator");
                (0..n).map(|_| Next::Terminal(copyable.copy_evaluator())).collect()
            }
        };

        let modifier = Arc::clone(&self.modifier);
        let values = self.values.clone();
        let pool = WorkerPool::new(self.threads);

        let jobs: Vec<(ParamValue, Box<dyn Classifier + Send>, Next)> = values
            .into_iter()
            .zip(classifier_copies.drain(..))
            .zip(next_copies.drain(..))
            .map(|((value, classifier), next)| (value, classifier, next))
            .collect();

        let dataset = dataset.clone();
        // Each copy (and the subtuner/evaluator fanned out with it) is
        // dropped when its job closure returns, so the winning candidate's
        // full parameter vector must be read out here, not from `self.next`
        // afterwards — `self.next` was never touched by this sweep.
        let results = pool.map(
            jobs,
            move |_, (value, mut classifier, mut next)| -> Result<(f64, Vec<ParamValue>)> {
                modifier.set(classifier.as_mut(), &value)?;
                let (err, sub_params) = Self::evaluate_candidate(&mut next, classifier.as_mut(), &dataset)?;
                let mut params = vec![value];
                params.extend(sub_params);
                Ok((err, params))
            },
        );
        pool.shutdown();

        for (index, result) in results.into_iter().enumerate() {
            let (err, params) = result?;
            if err < self.best_err {
                self.best_err = err;
                self.best_index = Some(index);
                self.best_params = params;
            }
        }

        self.replay_best(classifier)?;
        Ok(self.best_err)
    }

    /// Writes the full winning parameter vector (this link's value plus
    /// every subtuner's winning suffix) back into `classifier`, via
    /// [`Tuner::set_parameters`] so a multi-link chain replays completely
    /// rather than leaving inner links at whatever their last-evaluated
    /// candidate was.
    fn replay_best(&mut self, classifier: &mut dyn Classifier) -> Result<()> {
        if self.best_index.is_none() {
            return Err(CoreError::InvalidParameter(
                "no candidate evaluated without error".into(),
            ));
        }
        let params = self.best_params.clone();
        self.set_parameters(classifier, &params)?;
        if let Some(resumable) = classifier.as_resumable_mut() {
            resumable.reset();
        }
        Ok(())
    }
}

impl Tuner for GridTuner {
    fn tune(&mut self, classifier: &mut dyn Classifier, dataset: &Dataset) -> Result<f64> {
        if self.values.is_empty() {
            return Err(CoreError::InvalidParameter("tuner has no candidate values".into()));
        }
        if self.parallel_eligible(classifier) {
            self.tune_parallel(classifier, dataset)
        } else {
            self.tune_sequential(classifier, dataset)
        }
    }

    fn get_parameters(&self) -> Vec<ParamValue> {
        // Read from the vector captured at the moment `best_index` was
        // set, not from `self.next`'s live state: after the sweep, a
        // non-terminal `next` reflects its *last*-evaluated candidate,
        // not necessarily the one `best_index` picked.
        self.best_params.clone()
    }

    fn set_parameters(&mut self, classifier: &mut dyn Classifier, params: &[ParamValue]) -> Result<()> {
        let (value, rest) = params
            .split_first()
            .ok_or_else(|| CoreError::InvalidParameter("empty parameter vector".into()))?;
        self.modifier.set(classifier, value)?;
        match &mut self.next {
            Next::Sub(sub) => sub.set_parameters(classifier, rest),
            Next::Terminal(_) => Ok(()),
        }
    }

    fn affects_distance(&self) -> bool {
        self.affects_distance_chain()
    }

    fn as_resumable_mut(&mut self) -> Option<&mut dyn Resumable> {
        None
    }

    fn as_copyable(&self) -> Option<&dyn CopyableTuner> {
        Some(self)
    }
}

impl CopyableTuner for GridTuner {
    fn copy_tuner(&self, deep: bool) -> Box<dyn Tuner + Send> {
        let next = match &self.next {
            Next::Sub(sub) => {
                let sub_copyable = sub.as_copyable().expect("copy_tuner requires a Copyable subtuner");
                Next::Sub(sub_copyable.copy_tuner(deep))
            }
            Next::Terminal(evaluator) => Next::Terminal(
                evaluator
                    .as_copyable()
                    .expect("copy_tuner requires a Copyable terminal evaluator")
                    .copy_evaluator(),
            ),
        };
        Box::new(GridTuner {
            values: self.values.clone(),
            modifier: Arc::clone(&self.modifier),
            next,
            best_index: None,
            best_err: f64::INFINITY,
            best_params: Vec::new(),
            threads: self.threads,
        })
    }
}
