//! Cooperative cancellation.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use crate::error::GenerateError;

/// Shared flag polled by the searches. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    /// Remaining successful polls before the token cancels itself.
    budget: Option<AtomicU64>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that trips on poll number `polls + 1`. Makes cancellation points
    /// reproducible.
    #[must_use]
    pub fn with_poll_budget(polls: u64) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                budget: Some(AtomicU64::new(polls)),
            }),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Relaxed)
    }

    /// Poll the token.
    pub fn check(&self) -> Result<(), GenerateError> {
        if self.is_cancelled() {
            return Err(GenerateError::Cancelled);
        }
        if let Some(budget) = &self.inner.budget {
            if budget
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |b| b.checked_sub(1))
                .is_err()
            {
                self.cancel();
                return Err(GenerateError::Cancelled);
            }
        }
        Ok(())
    }
}
