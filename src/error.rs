use thiserror::Error;

use crate::mission::MissionKey;

/// Failure of a single remote call, as seen by the retry executor.
///
/// Only `Transport` is retried; the other kinds describe conditions that
/// another attempt cannot fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("session expired")]
    AuthExpired,

    #[error("unexpected response: {reason}")]
    Malformed { reason: String, body: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Terminal failure of one action or status query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MissionError {
    #[error("login session expired, re-authentication required")]
    AuthExpired,

    #[error("{context}: server returned an unexpected response ({reason})")]
    MalformedResponse {
        context: String,
        reason: String,
        body: String,
    },

    #[error("{context}: request failed after {attempts} attempt(s): {last_error}")]
    RetriesExhausted {
        context: String,
        attempts: u32,
        last_error: String,
    },

    #[error("ran out of candidate posts after {completed}/{target} interactions")]
    Exhausted { completed: u32, target: u32 },

    #[error("execution cancelled")]
    Cancelled,

    #[error("mission '{0}' has no executable action")]
    Unsupported(String),
}

impl MissionError {
    /// Numeric result code reported to callers that display codes.
    pub fn code(&self) -> i32 {
        match self {
            MissionError::AuthExpired => -1,
            MissionError::MalformedResponse { .. } => -2,
            MissionError::RetriesExhausted { .. } => -3,
            MissionError::Exhausted { .. } => -4,
            MissionError::Cancelled => -5,
            MissionError::Unsupported(_) => -6,
        }
    }

    /// Whether later missions for the same account should still be attempted.
    pub fn is_fatal_for_account(&self) -> bool {
        matches!(self, MissionError::AuthExpired | MissionError::Cancelled)
    }

    pub(crate) fn unsupported(key: &MissionKey) -> Self {
        MissionError::Unsupported(key.as_str().to_string())
    }
}

pub type Result<T> = std::result::Result<T, MissionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            MissionError::AuthExpired,
            MissionError::MalformedResponse {
                context: "sign".into(),
                reason: "missing field".into(),
                body: "{}".into(),
            },
            MissionError::RetriesExhausted {
                context: "sign".into(),
                attempts: 3,
                last_error: "timeout".into(),
            },
            MissionError::Exhausted {
                completed: 1,
                target: 5,
            },
            MissionError::Cancelled,
            MissionError::Unsupported("daily_lottery".into()),
        ];

        let mut codes: Vec<i32> = errors.iter().map(MissionError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert_eq!(MissionError::AuthExpired.code(), -1);
    }

    #[test]
    fn test_fatal_for_account() {
        assert!(MissionError::AuthExpired.is_fatal_for_account());
        assert!(MissionError::Cancelled.is_fatal_for_account());
        assert!(!MissionError::Exhausted {
            completed: 0,
            target: 1
        }
        .is_fatal_for_account());
    }

    #[test]
    fn test_display_mentions_progress() {
        let err = MissionError::Exhausted {
            completed: 2,
            target: 3,
        };
        assert_eq!(
            err.to_string(),
            "ran out of candidate posts after 2/3 interactions"
        );
    }
}
