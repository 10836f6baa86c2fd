//! Cooperative cancellation shared between the CLI and engine loops.
//!
//! Engine batch loops poll the token at well-defined item boundaries: once
//! per classified link triple, once per manifest entry during restore, once
//! per enumerated file during capture/compare. A raised token aborts the
//! remaining iterations of the current call with
//! [`EngineError::Cancelled`](crate::error::EngineError::Cancelled).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{EngineError, Result};

/// Shared cancellation flag, cheap to clone and poll.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. All clones observe the cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Return `Err(Cancelled)` when the flag is raised.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}
