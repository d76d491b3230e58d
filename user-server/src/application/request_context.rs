use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::infrastructure::crypto::generate_api_id;

/// Per-request identifiers and an optional deadline, built by the HTTP
/// middleware and passed explicitly into services.
#[derive(Debug, Clone)]
pub(crate) struct RequestContext {
    pub(crate) request_id: String,
    pub(crate) api_id: String,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub(crate) fn new(request_id: impl Into<String>, api_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            api_id: api_id.into(),
            deadline: None,
        }
    }

    /// Context with freshly generated ids, for callers outside the HTTP stack.
    pub(crate) fn generated() -> Self {
        Self::new(Uuid::new_v4().to_string(), generate_api_id())
    }

    /// Keeps an earlier deadline if one is already set.
    pub(crate) fn with_timeout(mut self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        });
        self
    }

    #[cfg(test)]
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub(crate) fn ensure_active(&self) -> Result<(), DomainError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(DomainError::RequestTimeout),
            _ => Ok(()),
        }
    }

    /// Runs `fut` under the deadline. The future is dropped once the deadline
    /// passes, which rolls back any transaction it holds.
    pub(crate) async fn within_deadline<T, F>(&self, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        self.ensure_active()?;
        let value = match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| DomainError::RequestTimeout)??,
            None => fut.await?,
        };
        self.ensure_active()?;
        Ok(value)
    }
}
