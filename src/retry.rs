//! Bounded retry with a fixed delay, shared by every remote call
//!
//! Only transport failures are retried. An expired session or a response the
//! classifier rejected ends the call on the first attempt.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::{CallError, MissionError, Result};

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// When false every call gets a single attempt
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum attempts for a retryable call
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Fixed delay between attempts
    #[serde(default = "default_delay", with = "humantime_serde")]
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            attempts: default_attempts(),
            delay: default_delay(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_attempts() -> u32 {
    3
}

fn default_delay() -> Duration {
    Duration::from_secs(5)
}

/// Sender side of a cancellation signal, held by the caller
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

/// Receiver side of a cancellation signal, held by the executor
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Option<watch::Receiver<bool>>);

impl CancelSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        Self(None)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once cancellation is requested; pends forever otherwise
    pub async fn cancelled(&self) {
        let Some(rx) = &self.0 else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Handle dropped without cancelling.
            std::future::pending::<()>().await;
        }
    }

    /// Sleep for `duration` unless cancelled first
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        if self.is_cancelled() {
            return Err(MissionError::Cancelled);
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = self.cancelled() => Err(MissionError::Cancelled),
        }
    }
}

/// Create a connected cancellation handle and signal
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), CancelSignal(Some(rx)))
}

/// Runs remote calls under the retry policy
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
    cancel: CancelSignal,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig, cancel: CancelSignal) -> Self {
        Self { config, cancel }
    }

    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Execute `operation` until it succeeds, fails terminally, or the
    /// attempt cap is reached. `operation` is invoked once per attempt so that
    /// each attempt builds a freshly signed request.
    pub async fn execute<F, Fut, T>(&self, context: &str, retryable: bool, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, CallError>>,
    {
        let max_attempts = if retryable {
            self.config.attempts.max(1)
        } else {
            1
        };
        let mut attempt = 0;

        loop {
            if self.cancel.is_cancelled() {
                debug!("{} cancelled before attempt {}", context, attempt + 1);
                return Err(MissionError::Cancelled);
            }
            attempt += 1;

            match operation().await {
                Ok(value) => return Ok(value),
                Err(CallError::AuthExpired) => {
                    info!("{}: login session expired", context);
                    return Err(MissionError::AuthExpired);
                }
                Err(CallError::Malformed { reason, body }) => {
                    error!("{}: server returned an unexpected response", context);
                    debug!(body = %body, reason = %reason, "{} raw response", context);
                    return Err(MissionError::MalformedResponse {
                        context: context.to_string(),
                        reason,
                        body,
                    });
                }
                Err(CallError::Transport(message)) => {
                    if attempt >= max_attempts {
                        error!(
                            "{}: request failed after {} attempt(s): {}",
                            context, attempt, message
                        );
                        return Err(MissionError::RetriesExhausted {
                            context: context.to_string(),
                            attempts: attempt,
                            last_error: message,
                        });
                    }
                    warn!(
                        "Retrying {} (attempt {}/{}) after {:?}: {}",
                        context, attempt, max_attempts, self.config.delay, message
                    );
                    self.cancel.sleep(self.config.delay).await?;
                }
            }
        }
    }
}
