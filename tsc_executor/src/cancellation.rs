//! Cooperative cancellation.
//!
//! There is no preemptive cancellation: every worker loop and outer
//! iteration checks [`CancellationToken::check`] at the documented
//! boundaries (fold loop, candidate-value loop, before each per-item
//! classification) and raises `Cancelled` when it observes the flag set.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tsc_traits::error::{CoreError, Result};

#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Re-entry after a `Cancelled` error clears the flag, not the
    /// evaluator's resumable state.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Raise `Cancelled` if cancellation has been requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            tracing::debug!("cancellation observed at cooperative checkpoint");
            Err(CoreError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_cancelled() {
        let token = CancellationToken::new();
        assert!(token.check().is_ok());
    }

    #[test]
    fn cancel_is_observed_by_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.check().is_err());
    }

    #[test]
    fn reset_clears_the_flag() {
        let token = CancellationToken::new();
        token.cancel();
        token.reset();
        assert!(token.check().is_ok());
    }
}
