use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::extract::ExtractStrategy;

/// Total request bound applied when a provider does not set its own.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Token limit sent to providers whose body carries one.
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// How the credential is placed on the outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthHeader {
    /// Header name, e.g. `Authorization` or `x-client-secret`.
    pub name: String,
    /// Optional scheme written before the key, e.g. `Bearer`.
    #[serde(default)]
    pub scheme: Option<String>,
}

impl AuthHeader {
    /// `Authorization: Bearer <key>`.
    pub fn bearer() -> Self {
        Self {
            name: "Authorization".into(),
            scheme: Some("Bearer".into()),
        }
    }

    /// `<name>: <key>` with no scheme.
    pub fn raw(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scheme: None,
        }
    }

    /// Header value for `key`.
    pub fn value_for(&self, key: &str) -> String {
        match self.scheme.as_deref() {
            Some(scheme) => format!("{scheme} {key}"),
            None => key.to_string(),
        }
    }
}

/// Shape of the JSON body sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestShape {
    /// Key holding the input text (`input`, `prompt`, ...).
    pub input_field: String,
    /// Model name, omitted from the body when `None`.
    #[serde(default)]
    pub model: Option<String>,
    /// Token limit, omitted from the body when `None`.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl RequestShape {
    pub fn build(&self, input: &str) -> Value {
        let mut body = Map::new();
        if let Some(model) = &self.model {
            body.insert("model".into(), Value::String(model.clone()));
        }
        body.insert(self.input_field.clone(), Value::String(input.to_string()));
        if let Some(max_tokens) = self.max_tokens {
            body.insert("max_tokens".into(), Value::from(max_tokens));
        }
        Value::Object(body)
    }
}

/// Everything an adapter needs to talk to one provider.
///
/// The API key is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Key used in the aggregated analysis map.
    pub name: String,
    /// Endpoint receiving the POST.
    pub base_url: String,
    /// Credential used when the caller passes none.
    #[serde(default)]
    pub api_key: Option<String>,
    pub auth_header: AuthHeader,
    pub request: RequestShape,
    /// Ordered response extraction chain.
    pub extraction: Vec<ExtractStrategy>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("auth_header", &self.auth_header)
            .field("request", &self.request)
            .field("extraction", &self.extraction)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// AI/ML completion API.
    pub fn ai_ml() -> Self {
        Self {
            name: "ai_ml".into(),
            base_url: "https://api.example-aiml.com/v1/complete".into(),
            api_key: None,
            auth_header: AuthHeader::bearer(),
            request: RequestShape {
                input_field: "input".into(),
                model: None,
                max_tokens: Some(DEFAULT_MAX_TOKENS),
            },
            extraction: vec![
                ExtractStrategy::field("result"),
                ExtractStrategy::first_candidate("choices", "text"),
            ],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Mistral generation API.
    pub fn mistral() -> Self {
        Self {
            name: "mistral".into(),
            base_url: "https://api.mistral.ai/v1/generate".into(),
            api_key: None,
            auth_header: AuthHeader::bearer(),
            request: RequestShape {
                input_field: "input".into(),
                model: Some("mistral-large".into()),
                max_tokens: None,
            },
            extraction: vec![
                ExtractStrategy::field("output"),
                ExtractStrategy::first_candidate("generations", "text"),
            ],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Nebius AI Studio generation API.
    pub fn nebius() -> Self {
        Self {
            name: "nebius".into(),
            base_url: "https://api.nebius.ai/v1/generate".into(),
            api_key: None,
            auth_header: AuthHeader::bearer(),
            request: RequestShape {
                input_field: "prompt".into(),
                model: Some("gpt-4o-mini".into()),
                max_tokens: Some(DEFAULT_MAX_TOKENS),
            },
            extraction: vec![
                ExtractStrategy::field("output"),
                ExtractStrategy::first_candidate("choices", "text"),
            ],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Crossmint partner API. Answers are passed through as raw JSON.
    ///
    /// Not part of the upload fan-out.
    pub fn crossmint() -> Self {
        Self {
            name: "crossmint".into(),
            base_url: "https://api.crossmint.io/v1/endpoint".into(),
            api_key: None,
            auth_header: AuthHeader::raw("x-client-secret"),
            request: RequestShape {
                input_field: "payload".into(),
                model: None,
                max_tokens: None,
            },
            extraction: vec![ExtractStrategy::Raw],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// The analysis providers every upload fans out to.
    pub fn analysis_defaults() -> Vec<Self> {
        vec![Self::ai_ml(), Self::mistral(), Self::nebius()]
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.name.trim().is_empty() {
            return Err(ProviderError::InvalidConfig("name must not be empty".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProviderError::InvalidConfig(format!(
                "{}: base_url must be an http(s) URL, got {:?}",
                self.name, self.base_url
            )));
        }
        if self.auth_header.name.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(format!(
                "{}: auth_header.name must not be empty",
                self.name
            )));
        }
        if self.request.input_field.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(format!(
                "{}: request.input_field must not be empty",
                self.name
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ProviderError::InvalidConfig(format!(
                "{}: timeout_secs must be >= 1",
                self.name
            )));
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn presets_validate() {
        for cfg in ProviderConfig::analysis_defaults() {
            cfg.validate().unwrap();
            assert_eq!(cfg.timeout_secs, 60);
            assert!(cfg.api_key.is_none());
        }
    }

    #[test]
    fn preset_names_are_in_fanout_order() {
        let names: Vec<_> = ProviderConfig::analysis_defaults()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["ai_ml", "mistral", "nebius"]);
    }

    #[test]
    fn request_bodies_match_provider_contracts() {
        assert_eq!(
            ProviderConfig::ai_ml().request.build("doc.pdf"),
            json!({"input": "doc.pdf", "max_tokens": 512})
        );
        assert_eq!(
            ProviderConfig::mistral().request.build("doc.pdf"),
            json!({"model": "mistral-large", "input": "doc.pdf"})
        );
        assert_eq!(
            ProviderConfig::nebius().request.build("doc.pdf"),
            json!({"model": "gpt-4o-mini", "prompt": "doc.pdf", "max_tokens": 512})
        );
    }

    #[test]
    fn crossmint_preset_uses_client_secret_and_raw_json() {
        let cfg = ProviderConfig::crossmint();
        cfg.validate().unwrap();
        assert_eq!(cfg.auth_header, AuthHeader::raw("x-client-secret"));
        assert_eq!(cfg.request.build("doc.pdf"), json!({"payload": "doc.pdf"}));
        assert_eq!(cfg.extraction, vec![ExtractStrategy::Raw]);
        assert!(ProviderConfig::analysis_defaults()
            .iter()
            .all(|p| p.name != "crossmint"));
    }

    #[test]
    fn auth_header_rendering() {
        assert_eq!(AuthHeader::bearer().value_for("k1"), "Bearer k1");
        assert_eq!(AuthHeader::raw("x-client-secret").value_for("k1"), "k1");
    }

    #[test]
    fn rejects_non_http_url_and_zero_timeout() {
        let cfg = ProviderConfig::ai_ml().with_base_url("ftp://example.com");
        assert!(matches!(cfg.validate(), Err(ProviderError::InvalidConfig(_))));

        let cfg = ProviderConfig::ai_ml().with_timeout_secs(0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = ProviderConfig::nebius().with_api_key("sk-very-secret");
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn config_deserializes_with_default_timeout() {
        let cfg: ProviderConfig = serde_json::from_value(json!({
            "name": "custom",
            "base_url": "http://localhost:9000/analyze",
            "auth_header": {"name": "x-api-key"},
            "request": {"input_field": "text"},
            "extraction": [{"kind": "field", "key": "summary"}]
        }))
        .unwrap();
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.auth_header.scheme, None);
        cfg.validate().unwrap();
    }
}
