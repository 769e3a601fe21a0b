//! Timeout and retry policy applied to every store lookup.

use crate::error::{MatchError, MatchResult, StoreError, StoreResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// How a single external lookup is guarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupPolicy {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Extra attempts after a transient failure.
    pub retries: usize,
    /// Base delay; doubled after every failed attempt.
    pub backoff: Duration,
}

impl Default for LookupPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retries: 3,
            backoff: Duration::from_millis(200),
        }
    }
}

impl LookupPolicy {
    /// Run `op` under the timeout, retrying transient failures with
    /// exponential backoff. Fatal failures are returned immediately.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> MatchResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let mut attempt = 0;

        loop {
            let outcome = match tokio::time::timeout(self.timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout {
                    store: what.to_string(),
                    timeout: self.timeout,
                }),
            };

            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_transient() {
                return Err(MatchError::Lookup {
                    what: what.to_string(),
                    source: err,
                });
            }

            if attempt >= self.retries {
                return Err(if self.retries == 0 {
                    MatchError::Lookup {
                        what: what.to_string(),
                        source: err,
                    }
                } else {
                    MatchError::RetriesExhausted {
                        what: what.to_string(),
                        attempts: attempt + 1,
                        source: err,
                    }
                });
            }

            let delay = self.backoff_for(attempt);
            warn!(
                "{} lookup failed: {} (retry {}/{} in {:?})",
                what,
                err,
                attempt + 1,
                self.retries,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn backoff_for(&self, attempt: usize) -> Duration {
        self.backoff.saturating_mul(1u32 << attempt.min(16))
    }
}
