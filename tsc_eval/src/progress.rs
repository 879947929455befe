//! Adapts the three evaluators' fold-completion events onto the shared
//! [`Callback`] capability. The emitting component (each evaluator) only
//! needs to announce the total unit count once and tick once per
//! completed fold; the callback implementation (e.g.
//! `tsc_executor::StepCallback`) owns the `step_size` gating and
//! serialization described in `tsc_traits::callback`.

use std::any::Any;
use std::sync::Arc;

use tsc_traits::Callback;

#[derive(Clone, Default)]
pub(crate) struct ProgressReporter(Option<Arc<dyn Callback>>);

impl ProgressReporter {
    pub(crate) fn new(callback: Option<Arc<dyn Callback>>) -> Self {
        Self(callback)
    }

    pub(crate) fn begin(&self, possible: u64, completed: u64) {
        if let Some(cb) = &self.0 {
            cb.set_possible_callback_number(possible);
            cb.set_callback_count(completed);
        }
    }

    pub(crate) fn tick(&self, source: &dyn Any) {
        if let Some(cb) = &self.0 {
            cb.callback(source);
        }
    }
}
