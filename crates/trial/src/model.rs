//! Model client — text and structured generation over a [`Provider`].

use mocktrial_core::error::{ProviderError, TrialError};
use mocktrial_core::provider::{Provider, ProviderRequest};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

/// Issues one system + user exchange per call.
#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn Provider>,
    max_tokens: Option<u32>,
    seed: Option<u64>,
}

impl ModelClient {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            max_tokens: None,
            seed: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Client that forwards `seed` with every request.
    pub fn seeded(&self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self.clone()
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn request(&self, model: &str, system: &str, user: &str, temperature: f32) -> ProviderRequest {
        let mut request = ProviderRequest::exchange(model, system, user, temperature);
        request.max_tokens = self.max_tokens;
        request.seed = self.seed;
        request
    }

    /// Free-text completion.
    pub async fn generate_text(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let request = self.request(model, system, user, temperature);
        let response = self.provider.complete(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                provider = %self.provider.name(),
                total_tokens = usage.total_tokens,
                "Completion received"
            );
        }
        Ok(response.message.content)
    }

    /// JSON-mode completion parsed into `T`, with one recovery attempt.
    pub async fn generate_structured<T: DeserializeOwned>(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<T, TrialError> {
        let mut request = self.request(model, system, user, temperature);
        request.json_mode = true;
        let response = self.provider.complete(request).await?;
        parse_structured(&response.message.content)
    }
}

/// Parse `raw` as `T`; failing that, parse the span from the first `{` to the
/// last `}`.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, TrialError> {
    let first_err = match serde_json::from_str::<T>(raw.trim()) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let span = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if end > start => &raw[start..=end],
        _ => {
            return Err(TrialError::Parse {
                reason: format!("no JSON object in model output ({first_err})"),
                raw: raw.to_string(),
            });
        }
    };

    match serde_json::from_str::<T>(span) {
        Ok(value) => {
            warn!(
                prefix_bytes = raw.find('{').unwrap_or(0),
                "Recovered structured output from surrounding text"
            );
            Ok(value)
        }
        Err(e) => Err(TrialError::Parse {
            reason: e.to_string(),
            raw: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::SequentialMockProvider;
    use mocktrial_core::trial::{Verdict, VerdictKind};

    #[test]
    fn parses_clean_json() {
        let v: Verdict =
            parse_structured(r#"{"verdict": "Guilty", "rationale": "Per [doc:1]."}"#).unwrap();
        assert_eq!(v.verdict, VerdictKind::Guilty);
    }

    #[test]
    fn recovers_json_inside_prose() {
        let raw = "Here is our decision:\n{\"verdict\": \"Not Guilty\", \"rationale\": \"Doubt.\"}\nThank you.";
        let v: Verdict = parse_structured(raw).unwrap();
        assert_eq!(v.verdict, VerdictKind::NotGuilty);
        assert_eq!(v.rationale, "Doubt.");
    }

    #[test]
    fn recovers_from_markdown_fence() {
        let raw = "```json\n{\"verdict\": \"Guilty\", \"rationale\": \"R.\"}\n```";
        let v: Verdict = parse_structured(raw).unwrap();
        assert_eq!(v.verdict, VerdictKind::Guilty);
    }

    #[test]
    fn no_braces_is_parse_error() {
        let err = parse_structured::<Verdict>("The defendant is guilty.").unwrap_err();
        match err {
            TrialError::Parse { raw, .. } => assert_eq!(raw, "The defendant is guilty."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reversed_braces_is_parse_error() {
        assert!(matches!(
            parse_structured::<Verdict>("} nothing {"),
            Err(TrialError::Parse { .. })
        ));
    }

    #[test]
    fn unknown_verdict_literal_is_parse_error() {
        assert!(matches!(
            parse_structured::<Verdict>(r#"{"verdict": "Maybe", "rationale": "x"}"#),
            Err(TrialError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn text_request_carries_options() {
        let provider = Arc::new(SequentialMockProvider::new(vec!["Members of the jury".into()]));
        let client = ModelClient::new(provider.clone())
            .with_max_tokens(256)
            .seeded(11);

        let text = client
            .generate_text("m", "sys", "user", 0.5)
            .await
            .unwrap();
        assert_eq!(text, "Members of the jury");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "m");
        assert_eq!(requests[0].seed, Some(11));
        assert_eq!(requests[0].max_tokens, Some(256));
        assert!(!requests[0].json_mode);
        assert_eq!(requests[0].messages[0].content, "sys");
        assert_eq!(requests[0].messages[1].content, "user");
    }

    #[tokio::test]
    async fn structured_request_uses_json_mode() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            r#"{"verdict": "Guilty", "rationale": "R."}"#.into(),
        ]));
        let client = ModelClient::new(provider.clone());
        let v: Verdict = client
            .generate_structured("m", "sys", "user", 0.3)
            .await
            .unwrap();
        assert_eq!(v.verdict, VerdictKind::Guilty);
        assert!(provider.requests()[0].json_mode);
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let provider = Arc::new(SequentialMockProvider::failing(ProviderError::Network(
            "refused".into(),
        )));
        let client = ModelClient::new(provider);
        let err = client
            .generate_structured::<Verdict>("m", "s", "u", 0.3)
            .await
            .unwrap_err();
        assert!(matches!(err, TrialError::Provider(ProviderError::Network(_))));
    }
}
