//! Execution context for one account

use std::sync::Arc;

use crate::account::{Account, DeviceSession, NoDeviceSession};
use crate::api::{ApiRequest, RawResponse, RequestFactory, RequestSigner, Transport};
use crate::config::MissionConfig;
use crate::error::{CallError, Result};
use crate::retry::{CancelSignal, RetryExecutor};

/// Shared, account-independent collaborators
///
/// Cloning is cheap; clones share the same transport (and with it the
/// connection pool), so one engine can serve many accounts concurrently.
#[derive(Clone)]
pub struct MissionEngine {
    config: Arc<MissionConfig>,
    transport: Arc<dyn Transport>,
    signer: Arc<dyn RequestSigner>,
    device_session: Arc<dyn DeviceSession>,
}

impl MissionEngine {
    pub fn new(
        config: MissionConfig,
        transport: Arc<dyn Transport>,
        signer: Arc<dyn RequestSigner>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            signer,
            device_session: Arc::new(NoDeviceSession),
        }
    }

    pub fn with_device_session(mut self, device_session: Arc<dyn DeviceSession>) -> Self {
        self.device_session = device_session;
        self
    }

    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    /// Create a runner for `account`; `cancel` stops further attempts and posts
    pub fn runner<'a>(&'a self, account: &'a Account, cancel: CancelSignal) -> MissionRunner<'a> {
        MissionRunner {
            engine: self,
            account,
            executor: RetryExecutor::new(self.config.retry.clone(), cancel),
        }
    }
}

/// Runs missions and status queries for a single borrowed account
pub struct MissionRunner<'a> {
    engine: &'a MissionEngine,
    account: &'a Account,
    executor: RetryExecutor,
}

impl<'a> MissionRunner<'a> {
    pub fn account(&self) -> &Account {
        self.account
    }

    pub fn config(&self) -> &MissionConfig {
        self.engine.config()
    }

    /// Run the external device login/registration handshake
    pub async fn prepare(&self) -> anyhow::Result<()> {
        self.engine
            .device_session
            .ensure_device_session(self.account)
            .await
    }

    fn factory(&self) -> RequestFactory<'_> {
        RequestFactory::new(&self.engine.config, self.account, self.engine.signer.as_ref())
    }

    /// Issue one remote call under the retry policy; `retry.enabled = false`
    /// limits it to a single attempt.
    ///
    /// `build` runs once per attempt so each attempt carries a fresh
    /// signature; `parse` classifies the raw response and applies the call
    /// site's own acceptance rules.
    pub(crate) async fn call<T, B, P>(&self, context: &str, build: B, parse: P) -> Result<T>
    where
        B: Fn(&RequestFactory<'_>) -> ApiRequest,
        P: Fn(&RawResponse) -> std::result::Result<T, CallError>,
    {
        let (build, parse) = (&build, &parse);
        let retryable = self.engine.config.retry.enabled;
        self.executor
            .execute(context, retryable, move || async move {
                let request = build(&self.factory());
                let response = self.engine.transport.send(request).await?;
                parse(&response)
            })
            .await
    }

    /// Fixed pause between post-level calls
    pub(crate) async fn pace(&self) -> Result<()> {
        self.executor
            .cancel_signal()
            .sleep(self.engine.config.pacing_delay)
            .await
    }
}
