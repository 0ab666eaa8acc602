//! Per-call cancellation and deadlines.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result, StoreError};

/// Request-scoped signals threaded through session operations.
///
/// When the cancellation token fires or the deadline passes, the
/// outstanding store call is dropped and the operation fails with
/// [`Error::Cancelled`] or [`Error::DeadlineExceeded`]. Whatever the store
/// already committed stays; a half-written list is the backend's concern.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that never cancels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort store calls when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Abort store calls after `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Abort store calls once `timeout` has elapsed from now.
    ///
    /// A timeout too large to represent as an instant sets no deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// The configured deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the context has already been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }

    /// Run a store call under this context's cancellation and deadline.
    pub(crate) async fn run<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, StoreError>>,
    {
        let bounded = async {
            match self.deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, call).await {
                    Ok(result) => result.map_err(Error::from),
                    Err(_) => Err(Error::DeadlineExceeded),
                },
                None => call.await.map_err(Error::from),
            }
        };

        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(Error::Cancelled),
                result = bounded => result,
            },
            None => bounded.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn slow_ok() -> std::result::Result<u32, StoreError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(1)
    }

    #[tokio::test]
    async fn test_no_signals_runs_to_completion() {
        let ctx = RequestContext::new();
        let value = ctx.run(async { Ok::<_, StoreError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let ctx = RequestContext::new();
        let err = ctx
            .run(async { Err::<(), _>(StoreError::Backend("boom".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_call() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = RequestContext::new().with_cancellation(token);

        assert!(ctx.is_cancelled());
        let err = ctx.run(slow_ok()).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn test_cancelled_during_call() {
        let token = CancellationToken::new();
        let ctx = RequestContext::new().with_cancellation(token.clone());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = ctx.run(slow_ok()).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_sets_no_deadline() {
        let ctx = RequestContext::new().with_timeout(Duration::MAX);
        assert!(ctx.deadline().is_none());

        let result = ctx.run(async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let ctx = RequestContext::new().with_timeout(Duration::from_millis(20));
        let err = ctx.run(slow_ok()).await.unwrap_err();
        assert!(matches!(err, Error::DeadlineExceeded));
    }
}
