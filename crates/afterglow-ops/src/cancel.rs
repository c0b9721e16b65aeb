//! Cooperative cancellation for the iterative effects.
//!
//! Reaction-diffusion and flow-paint run hundreds of whole-image iterations.
//! They poll a [`CancelToken`] at every iteration boundary and stop with
//! [`OpsError::Cancelled`] once it fires, either because another thread
//! called [`cancel`](CancelToken::cancel) or because its deadline passed.
//!
//! ```rust
//! use afterglow_ops::CancelToken;
//!
//! let token = CancelToken::new();
//! let handle = token.clone();
//! assert!(!token.is_cancelled());
//! handle.cancel();
//! assert!(token.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{OpsError, OpsResult};

/// Shared cancel flag with an optional deadline.
///
/// Clones share the flag, so any clone can cancel the others.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that only fires when cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a deadline after which the token reports cancelled.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Adds a deadline `budget` from now.
    pub fn with_timeout(self, budget: Duration) -> Self {
        self.with_deadline(Instant::now() + budget)
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once cancelled or past the deadline.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Errors with [`OpsError::Cancelled`] if the token has fired.
    ///
    /// `completed` is the number of iterations already applied.
    #[inline]
    pub fn check(&self, completed: usize) -> OpsResult<()> {
        if self.is_cancelled() {
            return Err(OpsError::Cancelled { completed });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_passes_until_cancelled() {
        let token = CancelToken::new();
        assert!(token.check(0).is_ok());
        token.clone().cancel();
        assert!(matches!(token.check(5), Err(OpsError::Cancelled { completed: 5 })));
    }

    #[test]
    fn test_expired_deadline() {
        let token = CancelToken::new().with_deadline(Instant::now());
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_far_deadline() {
        let token = CancelToken::new().with_timeout(Duration::from_secs(3600));
        assert!(!token.is_cancelled());
    }
}
