use crate::gateway::client::{GenerateRequest, GenerativeClient};
use crate::gateway::config::ApiKey;
use crate::prelude::GatewayResult;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted client for tests and offline runs; counts every call.
pub struct MockGenerativeClient {
    response: GatewayResult<String>,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockGenerativeClient {
    pub fn new(response: &str) -> Self {
        Self::with_result(Ok(response.to_string()))
    }

    pub fn with_result(response: GatewayResult<String>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }
}

impl GenerativeClient for MockGenerativeClient {
    async fn generate(&self, _api_key: &ApiKey, request: &GenerateRequest) -> GatewayResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }
        self.response.clone()
    }
}
