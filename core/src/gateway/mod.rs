//! Generative-AI gateway: strategic risk summaries and ID field extraction.
//!
//! Both operations issue at most one request per call and report failures
//! as [`GatewayError`]. A missing credential is detected before anything
//! leaves the process. Callers that want display text instead of an error
//! use [`summary_text`].

pub mod client;
pub mod config;
pub mod mock;
pub mod prompt;

pub use client::{GeminiClient, GenerateRequest, GenerativeClient, ImagePayload, RequestPart};
pub use config::{ApiKey, GatewayConfig};
pub use mock::MockGenerativeClient;

use crate::model::{Incident, SensorData};
use crate::prelude::{GatewayError, GatewayResult};
use crate::telemetry::{GatewayStats, LogManager, MetricsRecorder, Operation};
use serde::{Deserialize, Serialize};

pub const SUMMARY_MISSING_CREDENTIAL: &str = "API Key missing. Unable to perform AI analysis.";
pub const SUMMARY_UNAVAILABLE: &str = "AI Analysis unavailable due to connection error.";
pub const SUMMARY_EMPTY: &str = "Analysis failed.";

/// Fields read off an identity document. `None` means the service omitted
/// the field; an empty string means it was not visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedIdentity {
    pub full_name: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
}

/// Display text for a finished summary request.
pub fn summary_text(result: &GatewayResult<String>) -> String {
    match result {
        Ok(text) => text.clone(),
        Err(GatewayError::MissingCredential) => SUMMARY_MISSING_CREDENTIAL.into(),
        Err(GatewayError::EmptyResponse) => SUMMARY_EMPTY.into(),
        Err(_) => SUMMARY_UNAVAILABLE.into(),
    }
}

pub struct AiGateway<C> {
    client: C,
    credential: Option<ApiKey>,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl AiGateway<GeminiClient> {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(GeminiClient::new(config), config.api_key.clone())
    }
}

impl<C: GenerativeClient> AiGateway<C> {
    pub fn new(client: C, credential: Option<ApiKey>) -> Self {
        Self {
            client,
            credential,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("gateway"),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn stats(&self) -> GatewayStats {
        self.metrics.snapshot()
    }

    /// Asks the model for a short strategic summary of the current feed.
    pub async fn analyze_risk(
        &self,
        sensors: &[SensorData],
        incidents: &[Incident],
    ) -> GatewayResult<String> {
        let key = self.credential.as_ref().ok_or(GatewayError::MissingCredential)?;
        let prompt = prompt::risk_prompt(sensors, incidents)
            .map_err(|e| GatewayError::Transport(format!("encoding prompt: {e}")))?;

        let result = self
            .call(Operation::RiskSummary, key, &GenerateRequest::text(prompt))
            .await
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(GatewayError::EmptyResponse)
                } else {
                    Ok(text)
                }
            });
        if let Err(err) = &result {
            self.logger.warn(&format!("risk analysis failed: {err}"));
        }
        result
    }

    /// Reads name, ID number and address off a photographed ID card.
    pub async fn extract_identity(&self, image: &ImagePayload) -> GatewayResult<ExtractedIdentity> {
        let key = self.credential.as_ref().ok_or(GatewayError::MissingCredential)?;
        let request = GenerateRequest {
            parts: vec![
                RequestPart::InlineImage(image.clone()),
                RequestPart::Text(prompt::IDENTITY_INSTRUCTION.into()),
            ],
            response_schema: Some(prompt::identity_schema()),
        };

        let outcome = match self.call(Operation::IdentityExtraction, key, &request).await {
            Ok(text) => parse_identity(&text),
            Err(err) => Err(GatewayError::ExtractionFailed(err.to_string())),
        };
        if let Err(err) = &outcome {
            self.logger.warn(&format!("ID extraction failed: {err}"));
        }
        outcome
    }

    async fn call(
        &self,
        operation: Operation,
        key: &ApiKey,
        request: &GenerateRequest,
    ) -> GatewayResult<String> {
        self.metrics.record_request(operation);
        self.logger.trace(&format!("issuing {operation:?} request"));
        let result = self.client.generate(key, request).await;
        if result.is_err() {
            self.metrics.record_failure(operation);
        }
        result
    }
}

/// Parses the JSON object returned by the extraction call. Blank text is
/// treated as an empty object.
fn parse_identity(text: &str) -> GatewayResult<ExtractedIdentity> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Ok(ExtractedIdentity::default());
    }
    serde_json::from_str(body).map_err(|e| GatewayError::ExtractionFailed(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    match text.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed;

    fn key() -> Option<ApiKey> {
        ApiKey::new("test-key")
    }

    fn jpeg() -> ImagePayload {
        ImagePayload::from_base64("image/jpeg", "/9j/4AAQ")
    }

    #[tokio::test]
    async fn summary_without_credential_uses_fallback_and_no_request() {
        let gateway = AiGateway::new(MockGenerativeClient::new("should not be seen"), None);
        let result = gateway
            .analyze_risk(&seed::sensors(), &seed::incidents())
            .await;
        assert_eq!(result, Err(GatewayError::MissingCredential));
        assert_eq!(summary_text(&result), SUMMARY_MISSING_CREDENTIAL);
        assert_eq!(gateway.client().calls(), 0);
        assert_eq!(gateway.stats().total_requests(), 0);
    }

    #[tokio::test]
    async fn summary_returns_model_text() {
        let gateway = AiGateway::new(MockGenerativeClient::new("  Evacuate Sector 4.\n"), key());
        let result = gateway
            .analyze_risk(&seed::sensors(), &seed::incidents())
            .await;
        assert_eq!(result, Ok("  Evacuate Sector 4.\n".to_string()));
        assert_eq!(gateway.client().calls(), 1);

        let request = gateway.client().last_request().unwrap();
        assert!(request.response_schema.is_none());
        match &request.parts[0] {
            RequestPart::Text(prompt) => assert!(prompt.contains("SENS-R-01")),
            other => panic!("unexpected part {other:?}"),
        }
    }

    #[tokio::test]
    async fn summary_transport_failure_maps_to_unavailable() {
        let client =
            MockGenerativeClient::with_result(Err(GatewayError::Transport("refused".into())));
        let gateway = AiGateway::new(client, key());
        let result = gateway.analyze_risk(&[], &[]).await;
        assert_eq!(summary_text(&result), SUMMARY_UNAVAILABLE);
        assert_eq!(gateway.stats().summary_failures, 1);
    }

    #[tokio::test]
    async fn blank_summary_is_reported_as_empty() {
        let gateway = AiGateway::new(MockGenerativeClient::new("   "), key());
        let result = gateway.analyze_risk(&[], &[]).await;
        assert_eq!(result, Err(GatewayError::EmptyResponse));
        assert_eq!(summary_text(&result), SUMMARY_EMPTY);
    }

    #[tokio::test]
    async fn extraction_without_credential_fails_before_request() {
        let gateway = AiGateway::new(MockGenerativeClient::new("{}"), None);
        let err = gateway.extract_identity(&jpeg()).await.unwrap_err();
        assert!(err.is_missing_credential());
        assert_eq!(gateway.client().calls(), 0);
    }

    #[tokio::test]
    async fn extraction_parses_structured_fields() {
        let body = r#"{"fullName":"Jane Doe","nationalId":"X123","address":""}"#;
        let gateway = AiGateway::new(MockGenerativeClient::new(body), key());
        let identity = gateway.extract_identity(&jpeg()).await.unwrap();
        assert_eq!(identity.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(identity.national_id.as_deref(), Some("X123"));
        assert_eq!(identity.address.as_deref(), Some(""));

        let request = gateway.client().last_request().unwrap();
        assert!(request.response_schema.is_some());
        assert!(matches!(request.parts[0], RequestPart::InlineImage(_)));
    }

    #[tokio::test]
    async fn extraction_rejects_malformed_json() {
        let gateway = AiGateway::new(MockGenerativeClient::new("not json"), key());
        let err = gateway.extract_identity(&jpeg()).await.unwrap_err();
        assert!(matches!(err, GatewayError::ExtractionFailed(_)));
        assert_eq!(gateway.client().calls(), 1);
    }

    #[tokio::test]
    async fn extraction_service_error_becomes_extraction_failed() {
        let client = MockGenerativeClient::with_result(Err(GatewayError::Service {
            status: 503,
            body: "overloaded".into(),
        }));
        let gateway = AiGateway::new(client, key());
        let err = gateway.extract_identity(&jpeg()).await.unwrap_err();
        assert!(matches!(err, GatewayError::ExtractionFailed(_)));
        assert_eq!(gateway.stats().extraction_failures, 1);
    }

    #[test]
    fn fenced_json_is_accepted() {
        let identity = parse_identity("```json\n{\"fullName\":\"A\"}\n```").unwrap();
        assert_eq!(identity.full_name.as_deref(), Some("A"));
        assert_eq!(identity.national_id, None);
        assert_eq!(parse_identity("").unwrap(), ExtractedIdentity::default());
    }
}
