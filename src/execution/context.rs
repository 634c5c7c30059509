//! Per-request execution context: cancellation, deadline and caller data

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a context stopped accepting work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context canceled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellable context handed to the executor and every resolver.
///
/// Clones share the same cancellation token, so cancelling any clone cancels
/// the request.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    token: CancellationToken,
    deadline: Option<Instant>,
    data: Option<Arc<dyn Any + Send + Sync>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tie the context to an externally owned token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Expire the context `timeout` from now. An earlier existing deadline wins.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Attach application data for resolvers to read back with [`ExecutionContext::data`]
    pub fn with_data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    pub fn data<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.data.as_deref()?.downcast_ref::<T>()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// `Some` once the context is cancelled or past its deadline
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves when the context is cancelled or its deadline passes
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => ContextError::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                ContextError::Cancelled
            }
        }
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("cancelled", &self.token.is_cancelled())
            .field("deadline", &self.deadline)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}
