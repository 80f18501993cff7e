//! Account credentials and the device-session collaborator
//!
//! Credentials are owned by whatever stores them; the engine only borrows an
//! `Account` for the length of one invocation and never writes it back.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Credential bundle of one platform account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Phone number, used only to correlate log lines
    pub phone: String,
    /// Session cookies sent with every request
    #[serde(default)]
    pub cookie: BTreeMap<String, String>,
    /// Device identifier sent as `x-rpc-device_id` on forum requests
    pub device_id: String,
}

impl Account {
    /// Render the cookie jar as a `Cookie` header value
    pub fn cookie_header(&self) -> String {
        self.cookie
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Phone number with the middle digits hidden, for log output
    pub fn masked_phone(&self) -> String {
        let chars: Vec<char> = self.phone.chars().collect();
        if chars.len() < 7 {
            return self.phone.clone();
        }
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}****{tail}")
    }

    /// Read an account from a JSON file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read account file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid account file {}", path.display()))
    }
}

/// Device login/registration handshake performed before missions run
#[async_trait]
pub trait DeviceSession: Send + Sync {
    async fn ensure_device_session(&self, account: &Account) -> Result<()>;
}

/// Device session that assumes registration happened elsewhere
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDeviceSession;

#[async_trait]
impl DeviceSession for NoDeviceSession {
    async fn ensure_device_session(&self, _account: &Account) -> Result<()> {
        Ok(())
    }
}
