//! Freshness signature (`DS` header)
//!
//! The server binds the signature to the request payload and the current
//! time, so a value must never be reused across requests or attempts.

use rand::distr::{Alphanumeric, SampleString};
use rand::Rng;
use serde_json::Value;

use crate::config::{Platform, SigningConfig};

/// Derives the signature token for one request
pub trait RequestSigner: Send + Sync {
    fn sign(&self, body: Option<&Value>, platform: Platform) -> String;
}

/// Salted-md5 signer used by the mobile client
#[derive(Debug, Clone)]
pub struct DsSigner {
    salts: SigningConfig,
}

impl DsSigner {
    pub fn new(salts: SigningConfig) -> Self {
        Self { salts }
    }

    fn platform_salt(&self, platform: Platform) -> &str {
        match platform {
            Platform::Android => &self.salts.android_salt,
            Platform::Ios => &self.salts.ios_salt,
        }
    }

    /// Signature for a bodiless request at time `t` with nonce `r`
    pub fn plain_ds(salt: &str, t: i64, r: &str) -> String {
        let digest = md5::compute(format!("salt={salt}&t={t}&r={r}"));
        format!("{t},{r},{digest:x}")
    }

    /// Signature for a request carrying a JSON body
    pub fn body_ds(salt: &str, t: i64, r: u32, body: &Value, query: &str) -> String {
        let digest = md5::compute(format!("salt={salt}&t={t}&r={r}&b={body}&q={query}"));
        format!("{t},{r},{digest:x}")
    }
}

impl RequestSigner for DsSigner {
    fn sign(&self, body: Option<&Value>, platform: Platform) -> String {
        let t = chrono::Utc::now().timestamp();
        let mut rng = rand::rng();
        match body {
            Some(body) => {
                let r = rng.random_range(100_001..200_000);
                Self::body_ds(&self.salts.body_salt, t, r, body, "")
            }
            None => {
                let r = Alphanumeric.sample_string(&mut rng, 6).to_lowercase();
                Self::plain_ds(self.platform_salt(platform), t, &r)
            }
        }
    }
}
