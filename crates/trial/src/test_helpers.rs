//! Shared test helpers for trial tests.

use mocktrial_core::error::ProviderError;
use mocktrial_core::message::Message;
use mocktrial_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and records
/// the request. Once the queue is exhausted it returns the configured error,
/// or panics if none was set.
pub struct SequentialMockProvider {
    responses: Vec<String>,
    error: Option<ProviderError>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            error: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fails on the first call.
    pub fn failing(error: ProviderError) -> Self {
        Self::failing_after(Vec::new(), error)
    }

    /// Returns `responses` in order, then fails.
    pub fn failing_after(responses: Vec<String>, error: ProviderError) -> Self {
        Self {
            error: Some(error),
            ..Self::new(responses)
        }
    }

    /// Responses for a full run: eight advocacy turns, the verdict JSON, and
    /// the judge's opinion.
    pub fn full_run(verdict_json: &str) -> Self {
        let mut responses: Vec<String> = (0..8)
            .map(|i| format!("Argument {i} relying on [doc:0] and [kb:burden-of-proof]."))
            .collect();
        responses.push(verdict_json.to_string());
        responses.push("The court finds as the jury did, see [kb:reasonable-doubt].".into());
        Self::new(responses)
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let index = requests.len();
        requests.push(request);

        match self.responses.get(index) {
            Some(text) => Ok(make_text_response(text)),
            None => match &self.error {
                Some(error) => Err(error.clone()),
                None => panic!(
                    "SequentialMockProvider: no more responses (call #{index}, have {})",
                    self.responses.len()
                ),
            },
        }
    }
}

pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}
