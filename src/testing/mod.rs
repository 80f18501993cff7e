//! Testing utilities and fixtures
//!
//! Scripted transport, deterministic signer and canned server payloads for
//! exercising the engine without network access.

pub mod fixtures;
pub mod mocks;

pub use mocks::{CountingSigner, MockTransport};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::account::Account;
use crate::config::MissionConfig;
use crate::mission::MissionEngine;
use crate::retry::RetryConfig;

/// Account with a single cookie and a fixed device id
pub fn test_account() -> Account {
    Account {
        phone: "13800001234".to_string(),
        cookie: BTreeMap::from([("ltuid".to_string(), "10001".to_string())]),
        device_id: "test-device".to_string(),
    }
}

/// Configuration with no pacing pause and a near-zero retry delay
pub fn test_config() -> MissionConfig {
    MissionConfig {
        pacing_delay: Duration::ZERO,
        retry: RetryConfig {
            enabled: true,
            attempts: 3,
            delay: Duration::from_millis(1),
        },
        ..MissionConfig::default()
    }
}

/// Engine wired to `transport` with [`test_config`] and a counting signer
pub fn test_engine(transport: MockTransport) -> MissionEngine {
    test_engine_with(transport, test_config())
}

pub fn test_engine_with(transport: MockTransport, config: MissionConfig) -> MissionEngine {
    MissionEngine::new(
        config,
        Arc::new(transport),
        Arc::new(CountingSigner::default()),
    )
}
