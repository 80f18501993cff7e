//! Mock implementations for testing

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::{ApiRequest, RawResponse, RequestSigner, Transport};
use crate::config::Platform;
use crate::error::CallError;

#[derive(Default)]
struct MockState {
    responses: VecDeque<Result<RawResponse, CallError>>,
    requests: Vec<ApiRequest>,
}

/// Transport that replays scripted responses in order and records every
/// request it receives. Clones share the same script and log.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a response for the next request
    pub fn push(&self, response: Result<RawResponse, CallError>) {
        self.state().responses.push_back(response);
    }

    /// Queue an HTTP 200 response with `body`
    pub fn push_ok(&self, body: impl Into<String>) {
        self.push(Ok(RawResponse::ok(body)));
    }

    /// Queue a transport failure (timeout, reset, ...)
    pub fn push_transport_error(&self, message: &str) {
        self.push(Err(CallError::Transport(message.to_string())));
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }

    /// Number of requests whose URL contains `fragment`
    pub fn count_path(&self, fragment: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|request| request.url.contains(fragment))
            .count()
    }

    /// Responses still waiting to be consumed
    pub fn remaining(&self) -> usize {
        self.state().responses.len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, CallError> {
        let mut state = self.state();
        state.requests.push(request);
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(CallError::Transport("No mock response configured".into())))
    }
}

/// Signer that returns a distinct token per call and counts invocations
#[derive(Debug, Default)]
pub struct CountingSigner {
    calls: AtomicUsize,
}

impl CountingSigner {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RequestSigner for CountingSigner {
    fn sign(&self, body: Option<&Value>, _platform: Platform) -> String {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let kind = if body.is_some() { "body" } else { "plain" };
        format!("0,{kind},{n}")
    }
}
