//! Progress reporting: `step_size = desired / possible`,
//! computed once `possible` is known; one callback per unit of work when
//! `step_size >= 1.0` or `step_size == 0.0`, otherwise a callback every
//! `1 / step_size` units. All increments serialize on a single mutex so no
//! invocation of `callback` overlaps another.

use std::any::Any;
use std::sync::Mutex;

use tsc_traits::Callback;

struct Inner {
    desired: u64,
    possible: u64,
    step_size: f64,
    progress: f64,
    steps: f64,
    count: u64,
}

/// A [`Callback`] that fires a user-supplied sink at the `step_size`
/// cadence described above.
pub struct StepCallback {
    inner: Mutex<Inner>,
    sink: Box<dyn Fn(&dyn Any) + Send + Sync>,
}

impl StepCallback {
    pub fn new(desired: u64, sink: impl Fn(&dyn Any) + Send + Sync + 'static) -> Self {
        Self {
            inner: Mutex::new(Inner {
                desired,
                possible: 0,
                step_size: 0.0,
                progress: 0.0,
                steps: 1.0,
                count: 0,
            }),
            sink: Box::new(sink),
        }
    }

    /// Record one completed unit of work, invoking the sink when the
    /// cadence rule says to.
    pub fn tick(&self, source: &dyn Any) {
        let fire = {
            let mut inner = self.inner.lock().expect("callback mutex poisoned");
            inner.count += 1;
            let step_size = inner.step_size;
            if step_size >= 1.0 || step_size == 0.0 {
                true
            } else {
                inner.progress += step_size;
                inner.progress >= inner.steps
            }
        };
        if fire {
            (self.sink)(source);
            let mut inner = self.inner.lock().expect("callback mutex poisoned");
            inner.steps += 1.0;
        }
    }
}

impl Callback for StepCallback {
    fn desired_callback_number(&self) -> u64 {
        self.inner.lock().expect("callback mutex poisoned").desired
    }

    fn set_possible_callback_number(&self, possible: u64) {
        let mut inner = self.inner.lock().expect("callback mutex poisoned");
        inner.possible = possible;
        inner.step_size = if possible == 0 {
            0.0
        } else {
            inner.desired as f64 / possible as f64
        };
    }

    fn set_callback_count(&self, count: u64) {
        let mut inner = self.inner.lock().expect("callback mutex poisoned");
        inner.count = count;
        inner.progress = count as f64;
    }

    fn callback(&self, source: &dyn Any) {
        self.tick(source);
    }

    fn progress(&self) -> f64 {
        let inner = self.inner.lock().expect("callback mutex poisoned");
        if inner.possible == 0 {
            0.0
        } else {
            (inner.count as f64 / inner.possible as f64).min(1.0)
        }
    }
}
