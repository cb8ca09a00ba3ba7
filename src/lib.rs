//! Workspace umbrella crate for the docgate upload gateway.
//!
//! This crate stitches the auth, storage and provider layers into the
//! upload pipeline: bearer-token check, document persistence, concurrent
//! fan-out to analysis providers, aggregation keyed by provider name.

pub mod config;
mod pipeline;

pub use auth::{
    AuthError, Claims, Clock, DevBypass, FixedClock, SystemClock, TokenConfig, TokenIssuer,
    DEV_SENTINEL,
};
pub use providers::{
    build_adapters, http_client, AnalysisOutput, Analyzer, ExtractStrategy, ProviderAdapter,
    ProviderConfig, ProviderError,
};
pub use storage::{
    DocumentStore, PaymentLedger, PaymentRecord, PaymentRequest, StorageError, StoredDocument,
};

pub use crate::config::{ConfigLoadError, GatewayConfig};
pub use crate::pipeline::{
    bearer_token, AnalysisMap, FanoutPolicy, ProviderFailure, ProviderOutcome, UploadPipeline,
    UploadReceipt,
};

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Errors that abort an upload request.
#[derive(Debug)]
pub enum PipelineError {
    /// Missing, malformed, forged or expired bearer token.
    Unauthorized(String),
    /// Request content the pipeline cannot act on.
    Malformed(String),
    Storage(StorageError),
    Provider(ProviderError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Unauthorized(reason) => write!(f, "{reason}"),
            PipelineError::Malformed(reason) => write!(f, "malformed request: {reason}"),
            PipelineError::Storage(err) => write!(f, "document storage failed: {err}"),
            PipelineError::Provider(err) => write!(f, "analysis failed: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Storage(err) => Some(err),
            PipelineError::Provider(err) => Some(err),
            PipelineError::Unauthorized(_) | PipelineError::Malformed(_) => None,
        }
    }
}

impl From<StorageError> for PipelineError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::InvalidName(name) => {
                PipelineError::Malformed(format!("invalid file name {name:?}"))
            }
            other => PipelineError::Storage(other),
        }
    }
}

impl From<ProviderError> for PipelineError {
    fn from(value: ProviderError) -> Self {
        PipelineError::Provider(value)
    }
}

impl From<AuthError> for PipelineError {
    fn from(value: AuthError) -> Self {
        PipelineError::Unauthorized(format!("Invalid token: {value}"))
    }
}

/// Observer for pipeline stage latencies and outcomes.
pub trait PipelineMetrics: Send + Sync {
    fn record_verify(&self, latency: Duration, result: Result<(), &AuthError>);
    fn record_store(&self, latency: Duration, result: Result<(), &StorageError>);
    fn record_provider(
        &self,
        provider: &str,
        latency: Duration,
        result: Result<(), &ProviderError>,
    );
}
