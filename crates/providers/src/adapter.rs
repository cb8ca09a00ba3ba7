use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::extract::{extract, AnalysisOutput};

/// A backend that can analyze one input string.
///
/// The upload pipeline only sees this trait, which keeps provider HTTP
/// details out of the orchestration code and lets tests substitute fakes.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Key under which this analyzer's output is aggregated.
    fn name(&self) -> &str;

    /// Analyze `input` using the analyzer's configured credential.
    async fn analyze(&self, input: &str) -> Result<AnalysisOutput, ProviderError>;
}

/// HTTP adapter for a single configured provider.
///
/// One POST per call, no retries. The configured timeout bounds the whole
/// exchange including reading the body.
#[derive(Debug, Clone)]
pub struct ProviderAdapter {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl ProviderAdapter {
    /// Build an adapter sharing `client`'s connection pool.
    pub fn new(config: ProviderConfig, client: reqwest::Client) -> Result<Self, ProviderError> {
        config.validate()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Analyze `input`, preferring `credential` over the configured key.
    pub async fn analyze_with(
        &self,
        input: &str,
        credential: Option<&str>,
    ) -> Result<AnalysisOutput, ProviderError> {
        let provider = self.config.name.as_str();
        let api_key = credential
            .or(self.config.api_key.as_deref())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::MissingCredential {
                provider: provider.to_string(),
            })?;

        let start = Instant::now();
        let response = self.send(input, api_key).await?;
        let output = extract(&self.config.extraction, &response);

        info!(
            provider,
            duration_ms = start.elapsed().as_millis() as u64,
            structured = matches!(output, AnalysisOutput::Structured(_)),
            "provider call succeeded"
        );
        Ok(output)
    }

    async fn send(&self, input: &str, api_key: &str) -> Result<Value, ProviderError> {
        let provider = self.config.name.as_str();
        let body = self.config.request.build(input);

        debug!(provider, url = %self.config.base_url, "sending provider request");

        let response = self
            .client
            .post(&self.config.base_url)
            .timeout(self.config.timeout())
            .header(
                self.config.auth_header.name.as_str(),
                self.config.auth_header.value_for(api_key),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            warn!(provider, status = status.as_u16(), "provider returned error status");
            return Err(ProviderError::Status {
                provider: provider.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| ProviderError::InvalidResponse {
            provider: provider.to_string(),
            message: e.to_string(),
        })
    }

    fn map_transport(&self, err: reqwest::Error) -> ProviderError {
        let provider = self.config.name.clone();
        if err.is_timeout() {
            warn!(provider = %provider, timeout_secs = self.config.timeout_secs, "provider call timed out");
            ProviderError::Timeout {
                provider,
                timeout_secs: self.config.timeout_secs,
            }
        } else {
            warn!(provider = %provider, error = %err, "provider transport failure");
            ProviderError::Transport {
                provider,
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl Analyzer for ProviderAdapter {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn analyze(&self, input: &str) -> Result<AnalysisOutput, ProviderError> {
        self.analyze_with(input, None).await
    }
}
