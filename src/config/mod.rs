//! Engine configuration
//!
//! Loaded from an optional TOML file and then overridden by `MYSTOOL_*`
//! environment variables. Durations use humantime notation (`"5s"`, `"500ms"`).

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryConfig;

/// Get the default configuration file location
pub fn default_config_path() -> Result<PathBuf> {
    ProjectDirs::from("com", "mystool", "mystool")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .ok_or_else(|| anyhow!("Could not determine home directory"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionConfig {
    /// Per-request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Pause after every post-level call
    #[serde(default = "default_pacing_delay", with = "humantime_serde")]
    pub pacing_delay: Duration,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Posts to read when the read mission runs on its own
    #[serde(default = "default_read_times")]
    pub read_times: u32,

    /// Posts to like when the like mission runs on its own
    #[serde(default = "default_like_times")]
    pub like_times: u32,

    #[serde(default)]
    pub endpoints: EndpointConfig,

    #[serde(default)]
    pub device: DeviceProfile,

    #[serde(default)]
    pub signing: SigningConfig,

    #[serde(default)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Host serving forum, sign-in, like and share endpoints
    #[serde(default = "default_bbs_base")]
    pub bbs_base: String,
    /// Host serving the mission catalog and mission state endpoints
    #[serde(default = "default_takumi_base")]
    pub takumi_base: String,
}

/// Client identity presented to the remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    #[serde(default)]
    pub platform: Platform,
    #[serde(default = "default_app_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_web_user_agent")]
    pub web_user_agent: String,
    #[serde(default = "default_app_version")]
    pub app_version: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_device_model")]
    pub device_model: String,
    #[serde(default = "default_device_name")]
    pub device_name: String,
    #[serde(default = "default_sys_version")]
    pub sys_version: String,
}

/// Client platform the requests are signed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Android,
    Ios,
}

impl Platform {
    /// Value of the `x-rpc-client_type` header
    pub fn client_type(self) -> &'static str {
        match self {
            Platform::Ios => "1",
            Platform::Android => "2",
        }
    }
}

/// Secret salts used to derive the `DS` request signature
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SigningConfig {
    #[serde(default)]
    pub android_salt: String,
    #[serde(default)]
    pub ios_salt: String,
    /// Salt for requests that carry a JSON body
    #[serde(default)]
    pub body_salt: String,
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("android_salt", &redact(&self.android_salt))
            .field("ios_salt", &redact(&self.ios_salt))
            .field("body_salt", &redact(&self.body_salt))
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_pacing_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_read_times() -> u32 {
    5
}

fn default_like_times() -> u32 {
    10
}

fn default_bbs_base() -> String {
    "https://bbs-api.mihoyo.com".to_string()
}

fn default_takumi_base() -> String {
    "https://api-takumi.mihoyo.com".to_string()
}

fn default_app_user_agent() -> String {
    "okhttp/4.8.0".to_string()
}

fn default_web_user_agent() -> String {
    "Mozilla/5.0 (Linux; Android 12; Mi 10 Build/SKQ1.211006.001; wv) AppleWebKit/537.36 \
     (KHTML, like Gecko) Version/4.0 Chrome/103.0.5060.129 Mobile Safari/537.36 miHoYoBBS/2.36.1"
        .to_string()
}

fn default_app_version() -> String {
    "2.36.1".to_string()
}

fn default_channel() -> String {
    "miyousheluodi".to_string()
}

fn default_device_model() -> String {
    "Mi 10".to_string()
}

fn default_device_name() -> String {
    "Xiaomi".to_string()
}

fn default_sys_version() -> String {
    "12".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            bbs_base: default_bbs_base(),
            takumi_base: default_takumi_base(),
        }
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            user_agent: default_app_user_agent(),
            web_user_agent: default_web_user_agent(),
            app_version: default_app_version(),
            channel: default_channel(),
            device_model: default_device_model(),
            device_name: default_device_name(),
            sys_version: default_sys_version(),
        }
    }
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            pacing_delay: default_pacing_delay(),
            retry: RetryConfig::default(),
            read_times: default_read_times(),
            like_times: default_like_times(),
            endpoints: EndpointConfig::default(),
            device: DeviceProfile::default(),
            signing: SigningConfig::default(),
            log_level: None,
        }
    }
}

impl MissionConfig {
    /// Load configuration from `path`, or from the default location when no
    /// path is given, then apply environment overrides.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path).await?,
            None => {
                let default_path = default_config_path()?;
                if tokio::fs::try_exists(&default_path).await.unwrap_or(false) {
                    Self::from_file(&default_path).await?
                } else {
                    Self::default()
                }
            }
        };
        config.merge_env_vars();
        Ok(config)
    }

    async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn merge_env_vars(&mut self) {
        if let Ok(enabled) = std::env::var("MYSTOOL_RETRY_ENABLED") {
            if let Ok(value) = enabled.parse::<bool>() {
                self.retry.enabled = value;
            }
        }

        if let Ok(attempts) = std::env::var("MYSTOOL_RETRY_ATTEMPTS") {
            if let Ok(value) = attempts.parse::<u32>() {
                self.retry.attempts = value;
            }
        }

        if let Ok(timeout) = std::env::var("MYSTOOL_TIMEOUT") {
            if let Ok(value) = humantime_serde::re::humantime::parse_duration(&timeout) {
                self.timeout = value;
            }
        }

        if let Ok(salt) = std::env::var("MYSTOOL_DS_SALT") {
            match self.device.platform {
                Platform::Android => self.signing.android_salt = salt,
                Platform::Ios => self.signing.ios_salt = salt,
            }
        }

        if let Ok(salt) = std::env::var("MYSTOOL_DS_BODY_SALT") {
            self.signing.body_salt = salt;
        }

        if let Ok(log_level) = std::env::var("MYSTOOL_LOG_LEVEL") {
            self.log_level = Some(log_level);
        }
    }
}
