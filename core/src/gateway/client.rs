use crate::gateway::config::{ApiKey, GatewayConfig};
use crate::prelude::{GatewayError, GatewayResult};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

/// Base64 image data plus its MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    /// Wraps data the caller already base64-encoded.
    pub fn from_base64(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn encode(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::from_base64(
            mime_type,
            base64::engine::general_purpose::STANDARD.encode(bytes),
        )
    }

    /// MIME type guessed from a file extension, JPEG otherwise.
    pub fn mime_for_extension(extension: Option<&str>) -> &'static str {
        match extension.map(|ext| ext.to_ascii_lowercase()).as_deref() {
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some("heic") => "image/heic",
            _ => "image/jpeg",
        }
    }
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("encoded_len", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestPart {
    Text(String),
    InlineImage(ImagePayload),
}

/// Provider-neutral content generation request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerateRequest {
    pub parts: Vec<RequestPart>,
    /// When set, the service must answer with JSON of this shape.
    pub response_schema: Option<Value>,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![RequestPart::Text(prompt.into())],
            response_schema: None,
        }
    }
}

/// One round trip to a hosted generative model.
///
/// Implementations issue exactly one outbound request per call.
pub trait GenerativeClient: Send + Sync {
    fn generate(
        &self,
        api_key: &ApiKey,
        request: &GenerateRequest,
    ) -> impl Future<Output = GatewayResult<String>> + Send;
}

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    pub fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl GenerativeClient for GeminiClient {
    async fn generate(&self, api_key: &ApiKey, request: &GenerateRequest) -> GatewayResult<String> {
        let body = WireRequest::from(request);
        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: WireResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("decoding response: {e}")))?;
        Ok(parsed.text())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    contents: Vec<WireContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig<'a>>,
}

#[derive(Serialize)]
struct WireContent<'a> {
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: WireBlob<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

impl<'a> From<&'a GenerateRequest> for WireRequest<'a> {
    fn from(request: &'a GenerateRequest) -> Self {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                RequestPart::Text(text) => WirePart::Text {
                    text: text.as_str(),
                },
                RequestPart::InlineImage(image) => WirePart::Inline {
                    inline_data: WireBlob {
                        mime_type: image.mime_type.as_str(),
                        data: image.data.as_str(),
                    },
                },
            })
            .collect();
        Self {
            contents: vec![WireContent { parts }],
            generation_config: request
                .response_schema
                .as_ref()
                .map(|schema| WireGenerationConfig {
                    response_mime_type: "application/json",
                    response_schema: schema,
                }),
        }
    }
}

#[derive(Deserialize, Default)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Deserialize)]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireCandidateContent>,
}

#[derive(Deserialize)]
struct WireCandidateContent {
    #[serde(default)]
    parts: Vec<WireResponsePart>,
}

#[derive(Deserialize)]
struct WireResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl WireResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_request_has_no_generation_config() {
        let request = GenerateRequest::text("hello");
        let wire = serde_json::to_value(WireRequest::from(&request)).unwrap();
        assert_eq!(wire, json!({ "contents": [{ "parts": [{ "text": "hello" }] }] }));
    }

    #[test]
    fn image_request_carries_inline_data_and_schema() {
        let request = GenerateRequest {
            parts: vec![
                RequestPart::InlineImage(ImagePayload::from_base64("image/jpeg", "AAAA")),
                RequestPart::Text("extract".into()),
            ],
            response_schema: Some(json!({ "type": "OBJECT" })),
        };
        let wire = serde_json::to_value(WireRequest::from(&request)).unwrap();
        let parts = &wire["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "AAAA");
        assert_eq!(parts[1]["text"], "extract");
        assert_eq!(
            wire["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(wire["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let response: WireResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Evacuate " }, { "text": "Sector 4." }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(response.text(), "Evacuate Sector 4.");
    }

    #[test]
    fn response_without_candidates_is_empty() {
        let response: WireResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.text(), "");
    }

    #[test]
    fn encode_produces_standard_base64() {
        let image = ImagePayload::encode("image/png", b"hi");
        assert_eq!(image.data, "aGk=");
        assert_eq!(ImagePayload::mime_for_extension(Some("PNG")), "image/png");
        assert_eq!(ImagePayload::mime_for_extension(None), "image/jpeg");
    }

    #[test]
    fn url_targets_model_endpoint() {
        let client = GeminiClient::new(&GatewayConfig::default());
        assert_eq!(
            client.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
