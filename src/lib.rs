//! # mystool
//!
//! Mission engine for the community platform's point tasks: forum sign-in,
//! reading, liking and sharing posts, plus a progress view of the declared
//! missions.
//!
//! ## Modules
//!
//! - `account` - Borrowed account credentials and the device-session seam
//! - `api` - Request construction, `DS` signing, transport and response classification
//! - `config` - Configuration loading with environment overrides
//! - `error` - Failure taxonomy shared by every action
//! - `game` - Supported games and their forum identifiers
//! - `mission` - Actions, candidate paging and mission progress
//! - `retry` - Bounded retry executor and cancellation
//! - `testing` - Scripted transport and fixtures for tests
pub mod account;
pub mod api;
pub mod config;
pub mod error;
pub mod game;
pub mod mission;
pub mod retry;

pub mod testing;

pub use account::{Account, DeviceSession, NoDeviceSession};
pub use config::MissionConfig;
pub use error::{CallError, MissionError};
pub use game::Game;
pub use mission::{
    ActionOutcome, Mission, MissionEngine, MissionKey, MissionProgress, MissionRunner,
    MissionStatus,
};
pub use retry::{cancel_pair, CancelHandle, CancelSignal};
