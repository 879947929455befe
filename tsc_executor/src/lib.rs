#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
//! The executor and concurrency primitives shared by the tuner and
//! evaluator crates: a bounded worker pool, a cooperative
//! cancellation token, progress-callback synchronization, a guard that
//! prevents classifier thread-pool oversubscription, and copy-on-write
//! fan-out helpers for parallel tune/classify.

mod callback;
mod cancellation;
mod copy;
mod guard;
mod pool;

pub use callback::StepCallback;
pub use cancellation::CancellationToken;
pub use copy::{fan_out_classifier, fan_out_tuner};
pub use guard::ThreadCountGuard;
pub use pool::WorkerPool;
