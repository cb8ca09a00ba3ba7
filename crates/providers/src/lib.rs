//! docgate provider adapters
//!
//! One parameterized HTTP adapter wraps every third-party analysis
//! service. What differs between providers lives in [`ProviderConfig`]:
//!
//! - the endpoint (`base_url`)
//! - the authorization header convention ([`AuthHeader`])
//! - the request body shape ([`RequestShape`])
//! - an ordered response extraction chain ([`ExtractStrategy`])
//!
//! Presets exist for the three analysis backends the gateway fans out to:
//! [`ProviderConfig::ai_ml`], [`ProviderConfig::mistral`] and
//! [`ProviderConfig::nebius`]. [`ProviderConfig::crossmint`] covers the
//! partner API, which returns its JSON untouched.
//!
//! ## Example
//!
//! ```no_run
//! use providers::{http_client, Analyzer, ProviderAdapter, ProviderConfig};
//!
//! # async fn run() -> Result<(), providers::ProviderError> {
//! let client = http_client()?;
//! let adapter = ProviderAdapter::new(ProviderConfig::nebius().with_api_key("nb-xxx"), client)?;
//! let output = adapter.analyze("quarterly-report.pdf").await?;
//! println!("{output:?}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

mod adapter;
mod config;
mod error;
mod extract;

pub use crate::adapter::{Analyzer, ProviderAdapter};
pub use crate::config::{
    AuthHeader, ProviderConfig, RequestShape, DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_SECS,
};
pub use crate::error::ProviderError;
pub use crate::extract::{extract, AnalysisOutput, ExtractStrategy};

/// HTTP client shared by all adapters.
///
/// Per-request timeouts come from each provider's config; only the connect
/// phase is bounded here.
pub fn http_client() -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| ProviderError::InvalidConfig(format!("failed to build HTTP client: {e}")))
}

/// Build one adapter per config, all sharing `client`.
pub fn build_adapters(
    configs: &[ProviderConfig],
    client: &reqwest::Client,
) -> Result<Vec<ProviderAdapter>, ProviderError> {
    configs
        .iter()
        .cloned()
        .map(|cfg| ProviderAdapter::new(cfg, client.clone()))
        .collect()
}
