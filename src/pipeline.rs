use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use auth::{Claims, TokenIssuer};
use futures::future::{join_all, try_join_all};
use providers::{AnalysisOutput, Analyzer, ProviderError};
use serde::{Deserialize, Serialize};
use storage::{DocumentStore, StoredDocument};
use tracing::{info, warn};

use crate::{PipelineError, PipelineMetrics};

const BEARER_PREFIX: &str = "Bearer ";

/// How provider failures affect an upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanoutPolicy {
    /// The first provider failure fails the whole request.
    #[default]
    AllOrNothing,
    /// Every provider is awaited; failures are tagged per provider.
    Partial,
}

/// Failure tag reported under [`FanoutPolicy::Partial`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub kind: &'static str,
    pub message: String,
}

/// One provider's entry in the aggregated analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProviderOutcome {
    Ok(AnalysisOutput),
    Failed { error: ProviderFailure },
}

impl ProviderOutcome {
    pub fn output(&self) -> Option<&AnalysisOutput> {
        match self {
            ProviderOutcome::Ok(output) => Some(output),
            ProviderOutcome::Failed { .. } => None,
        }
    }
}

impl From<Result<AnalysisOutput, ProviderError>> for ProviderOutcome {
    fn from(result: Result<AnalysisOutput, ProviderError>) -> Self {
        match result {
            Ok(output) => ProviderOutcome::Ok(output),
            Err(err) => ProviderOutcome::Failed {
                error: ProviderFailure {
                    kind: err.kind(),
                    message: err.to_string(),
                },
            },
        }
    }
}

/// Provider name to outcome.
pub type AnalysisMap = BTreeMap<String, ProviderOutcome>;

/// Response body of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadReceipt {
    pub status: &'static str,
    /// Storage name of the uploaded document.
    pub file: String,
    pub analysis: AnalysisMap,
    /// `sub` claim of the token that authorized the upload.
    pub owner: String,
}

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header?.strip_prefix(BEARER_PREFIX)
}

/// Input handed to every analyzer for a stored document.
///
/// Providers currently receive the storage name rather than the document
/// bytes; switching to content means changing only this function.
fn analysis_input<'a>(doc: &'a StoredDocument, _content: &'a [u8]) -> &'a str {
    &doc.file_name
}

/// Sequences authentication, storage and provider fan-out for one upload.
pub struct UploadPipeline {
    issuer: Arc<TokenIssuer>,
    store: DocumentStore,
    analyzers: Vec<Arc<dyn Analyzer>>,
    policy: FanoutPolicy,
    metrics: Option<Arc<dyn PipelineMetrics>>,
}

impl UploadPipeline {
    pub fn new(
        issuer: Arc<TokenIssuer>,
        store: DocumentStore,
        analyzers: Vec<Arc<dyn Analyzer>>,
    ) -> Self {
        Self {
            issuer,
            store,
            analyzers,
            policy: FanoutPolicy::default(),
            metrics: None,
        }
    }

    pub fn with_policy(mut self, policy: FanoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn policy(&self) -> FanoutPolicy {
        self.policy
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    /// Validate an `Authorization` header value and return the token's claims.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<Claims, PipelineError> {
        let token = bearer_token(authorization).ok_or_else(|| {
            PipelineError::Unauthorized("Authorization header missing or invalid".into())
        })?;

        let start = Instant::now();
        let result = self.issuer.verify(token);
        if let Some(metrics) = &self.metrics {
            metrics.record_verify(start.elapsed(), result.as_ref().map(|_| ()));
        }

        result.map_err(|err| {
            warn!(error = %err, "rejected upload token");
            PipelineError::from(err)
        })
    }

    /// Authenticate, store and analyze one upload.
    pub async fn handle_upload(
        &self,
        authorization: Option<&str>,
        file_name: &str,
        content: &[u8],
    ) -> Result<UploadReceipt, PipelineError> {
        let claims = self.authorize(authorization)?;
        self.process(&claims, file_name, content).await
    }

    /// Store and analyze an upload already authorized by `claims`.
    pub async fn process(
        &self,
        claims: &Claims,
        file_name: &str,
        content: &[u8],
    ) -> Result<UploadReceipt, PipelineError> {
        let start = Instant::now();
        let stored = self.store.store(&claims.sub, file_name, content).await;
        if let Some(metrics) = &self.metrics {
            metrics.record_store(start.elapsed(), stored.as_ref().map(|_| ()));
        }
        let doc = stored?;

        let analysis = self.analyze(analysis_input(&doc, content)).await?;

        info!(
            file = %doc.file_name,
            owner = %claims.sub,
            providers = analysis.len(),
            "upload analyzed"
        );

        Ok(UploadReceipt {
            status: "done",
            file: doc.file_name,
            analysis,
            owner: claims.sub.clone(),
        })
    }

    /// Run every analyzer concurrently on `input` under the configured policy.
    pub async fn analyze(&self, input: &str) -> Result<AnalysisMap, PipelineError> {
        let calls = self.analyzers.iter().map(|analyzer| async move {
            let result = self.call(analyzer.as_ref(), input).await;
            (analyzer.name().to_string(), result)
        });

        match self.policy {
            FanoutPolicy::AllOrNothing => {
                let outputs = try_join_all(calls.map(|call| async move {
                    let (name, result) = call.await;
                    result.map(|output| (name, ProviderOutcome::Ok(output)))
                }))
                .await?;
                Ok(outputs.into_iter().collect())
            }
            FanoutPolicy::Partial => Ok(join_all(calls)
                .await
                .into_iter()
                .map(|(name, result)| (name, ProviderOutcome::from(result)))
                .collect()),
        }
    }

    async fn call(
        &self,
        analyzer: &dyn Analyzer,
        input: &str,
    ) -> Result<AnalysisOutput, ProviderError> {
        let start = Instant::now();
        let result = analyzer.analyze(input).await;
        if let Some(metrics) = &self.metrics {
            metrics.record_provider(analyzer.name(), start.elapsed(), result.as_ref().map(|_| ()));
        }
        if let Err(err) = &result {
            warn!(provider = analyzer.name(), kind = err.kind(), error = %err, "provider call failed");
        }
        result
    }
}
