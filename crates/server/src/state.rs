use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::metrics::FacadeMetrics;
use docgate::{
    Analyzer, DevBypass, DocumentStore, GatewayConfig, PaymentLedger, TokenIssuer,
    UploadPipeline,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Gateway configuration (auth, providers, storage, payments)
    pub gateway: Arc<GatewayConfig>,

    pub issuer: Arc<TokenIssuer>,

    /// Upload orchestrator (shared across requests)
    pub pipeline: Arc<UploadPipeline>,

    pub ledger: PaymentLedger,

    pub dev: DevBypass,

    /// Prometheus render handle, present when the exporter is installed
    pub prometheus: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state with one HTTP adapter per configured provider
    pub async fn new(config: ServerConfig, gateway: GatewayConfig) -> ServerResult<Self> {
        let client =
            docgate::http_client().map_err(|e| ServerError::Config(e.to_string()))?;
        let analyzers = docgate::build_adapters(&gateway.providers, &client)
            .map_err(|e| ServerError::Config(e.to_string()))?
            .into_iter()
            .map(|adapter| Arc::new(adapter) as Arc<dyn Analyzer>)
            .collect();

        Self::with_analyzers(config, gateway, analyzers).await
    }

    /// Create server state around an explicit set of analyzers
    pub async fn with_analyzers(
        config: ServerConfig,
        gateway: GatewayConfig,
        analyzers: Vec<Arc<dyn Analyzer>>,
    ) -> ServerResult<Self> {
        gateway
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        if gateway.auth.uses_default_secret() {
            tracing::warn!("JWT_SECRET not set, signing tokens with the built-in development secret");
        }
        let slowest = gateway.providers.iter().map(|p| p.timeout_secs).max();
        if let Some(provider_timeout) = slowest.filter(|t| *t >= config.timeout_secs) {
            tracing::warn!(
                request_timeout_secs = config.timeout_secs,
                provider_timeout_secs = provider_timeout,
                "request timeout does not exceed provider timeout; slow providers will surface as 408"
            );
        }

        let issuer = Arc::new(
            TokenIssuer::new(gateway.auth.clone()).map_err(|e| ServerError::Config(e.to_string()))?,
        );
        let store = DocumentStore::open(gateway.storage.docs_dir()).await?;
        let ledger = PaymentLedger::open(
            gateway.storage.payments_dir(),
            gateway.payments.receiver.clone(),
            gateway.payments.currency.clone(),
        )
        .await?;

        let dev = DevBypass::new(gateway.dev_mode);
        dev.announce();

        let pipeline = UploadPipeline::new(issuer.clone(), store, analyzers)
            .with_policy(gateway.fanout)
            .with_metrics(Arc::new(FacadeMetrics));

        tracing::info!(
            providers = ?pipeline.provider_names(),
            fanout = ?gateway.fanout,
            dev_mode = gateway.dev_mode,
            storage_root = %gateway.storage.root.display(),
            "gateway state ready"
        );

        Ok(Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            issuer,
            pipeline: Arc::new(pipeline),
            ledger,
            dev,
            prometheus: None,
        })
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
