use std::env;
use std::fmt;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted for the credential, in order.
pub const CREDENTIAL_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

/// API credential; never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Blank values count as no credential.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub endpoint: String,
}

impl GatewayConfig {
    /// Reads the credential from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = CREDENTIAL_VARS
            .iter()
            .find_map(|name| lookup(name).and_then(ApiKey::new));
        Self {
            api_key,
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credential_is_absent() {
        let config = GatewayConfig::from_lookup(|name| match name {
            "API_KEY" => Some("   ".into()),
            _ => None,
        });
        assert!(!config.has_credential());
    }

    #[test]
    fn falls_back_to_gemini_variable() {
        let config = GatewayConfig::from_lookup(|name| match name {
            "GEMINI_API_KEY" => Some("secret".into()),
            _ => None,
        });
        assert_eq!(config.api_key.unwrap().expose(), "secret");
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn debug_output_hides_key() {
        let key = ApiKey::new("secret").unwrap();
        assert!(!format!("{key:?}").contains("secret"));
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let config = GatewayConfig::default().with_endpoint("http://localhost:8080/v1/");
        assert_eq!(config.endpoint, "http://localhost:8080/v1");
    }
}
