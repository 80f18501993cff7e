//! Mission model and execution
//!
//! - `runner` - per-account execution context shared by everything below
//! - `pager` - candidate posts for read/like/share
//! - `actions` - sign, read, like, share and mission dispatch
//! - `catalog` - mission definitions joined with the account's progress

pub mod actions;
pub mod catalog;
pub mod pager;
pub mod runner;

pub use actions::{ActionOutcome, MissionRun};
pub use catalog::{MissionProgress, MissionStatus};
pub use pager::PostCandidate;
pub use runner::{MissionEngine, MissionRunner};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a remote mission, derived from the server's `mission_key`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionKey {
    Sign,
    Read,
    Like,
    Share,
    /// A key this client has no action for; reported but never executed
    Unclassified(String),
}

impl MissionKey {
    pub const SIGN: &'static str = "continuous_sign";
    pub const READ: &'static str = "view_post_0";
    pub const LIKE: &'static str = "post_up_0";
    pub const SHARE: &'static str = "share_post_0";

    pub fn from_raw(raw: &str) -> Self {
        match raw {
            Self::SIGN => MissionKey::Sign,
            Self::READ => MissionKey::Read,
            Self::LIKE => MissionKey::Like,
            Self::SHARE => MissionKey::Share,
            other => MissionKey::Unclassified(other.to_string()),
        }
    }

    /// The raw key as the server spells it
    pub fn as_str(&self) -> &str {
        match self {
            MissionKey::Sign => Self::SIGN,
            MissionKey::Read => Self::READ,
            MissionKey::Like => Self::LIKE,
            MissionKey::Share => Self::SHARE,
            MissionKey::Unclassified(raw) => raw,
        }
    }

    pub fn is_executable(&self) -> bool {
        !matches!(self, MissionKey::Unclassified(_))
    }
}

impl fmt::Display for MissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mission as declared by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    /// Reward for completing the mission
    pub points: i64,
    /// Display name, e.g. "讨论区签到"
    pub name: String,
    pub key: MissionKey,
    /// Number of completions the server requires
    pub threshold: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_round_trip() {
        for key in [
            MissionKey::Sign,
            MissionKey::Read,
            MissionKey::Like,
            MissionKey::Share,
        ] {
            assert_eq!(MissionKey::from_raw(key.as_str()), key);
            assert!(key.is_executable());
        }
    }

    #[test]
    fn test_unknown_key_is_unclassified() {
        let key = MissionKey::from_raw("daily_lottery");
        assert_eq!(key, MissionKey::Unclassified("daily_lottery".to_string()));
        assert_eq!(key.as_str(), "daily_lottery");
        assert!(!key.is_executable());
    }
}
