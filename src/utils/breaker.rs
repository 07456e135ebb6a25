//! Bounded-attempt execution policy for remote work
//!
//! An action reports each failed attempt as a [`Step`]: retry it, cancel the
//! whole call, or abort with a fatal error. The policy turns that into one
//! final verdict so the caller only distinguishes success, cancellation,
//! exhaustion and fatal failure.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// How an attempt failed
#[derive(Debug)]
pub enum Step<E> {
    /// Transient failure, try again if attempts remain
    Retry(E),
    /// Stop without retrying; not an error
    Cancel,
    /// Fatal failure, stop without retrying
    Abort(E),
}

/// Final verdict of a failed execution
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    #[error("execution cancelled")]
    Cancelled,

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    #[error("{0}")]
    Aborted(E),
}

/// Strategy for executing one unit of remote work
#[allow(async_fn_in_trait)]
pub trait RetryPolicy {
    async fn execute<T, E, F, Fut>(&self, action: F) -> Result<T, BreakerError<E>>
    where
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Step<E>>>;
}

/// Circuit breaker allowing a fixed number of attempts with a cooldown between them
#[derive(Debug, Clone, Copy)]
pub struct Breaker {
    attempts: u32,
    cooldown: Duration,
}

impl Breaker {
    pub const DEFAULT_ATTEMPTS: u32 = 3;
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);

    /// `attempts` is clamped to at least one
    pub fn new(attempts: u32, cooldown: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            cooldown,
        }
    }
}

impl Default for Breaker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_COOLDOWN)
    }
}

impl RetryPolicy for Breaker {
    async fn execute<T, E, F, Fut>(&self, mut action: F) -> Result<T, BreakerError<E>>
    where
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Step<E>>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match action().await {
                Ok(value) => return Ok(value),
                Err(Step::Cancel) => return Err(BreakerError::Cancelled),
                Err(Step::Abort(e)) => return Err(BreakerError::Aborted(e)),
                Err(Step::Retry(e)) => {
                    if attempt >= self.attempts {
                        return Err(BreakerError::Exhausted {
                            attempts: attempt,
                            last: e,
                        });
                    }
                    warn!(
                        "Attempt {}/{} failed, retrying in {}ms: {}",
                        attempt,
                        self.attempts,
                        self.cooldown.as_millis(),
                        e
                    );
                    if !self.cooldown.is_zero() {
                        tokio::time::sleep(self.cooldown).await;
                    }
                }
            }
        }
    }
}
