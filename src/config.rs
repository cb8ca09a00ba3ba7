//! Gateway configuration.
//!
//! [`GatewayConfig`] is built once at process start and shared read-only.
//! It can be loaded from a YAML file, after which the flat environment
//! variables used by existing deployments are applied as overrides.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//!
//! auth:
//!   secret: "change-me"
//!   default_validity_hours: 1
//!   long_lived_hours: 24
//!
//! dev_mode: false
//! fanout: all_or_nothing   # or: partial
//!
//! storage:
//!   root: "uploads"
//!
//! payments:
//!   receiver: "DemoReceiver1"
//!   currency: "SOL"
//!
//! providers:
//!   - name: ai_ml
//!     base_url: "https://api.example-aiml.com/v1/complete"
//!     auth_header: { name: Authorization, scheme: Bearer }
//!     request: { input_field: input, max_tokens: 512 }
//!     extraction:
//!       - { kind: field, key: result }
//!       - { kind: first_candidate, list: choices, text: text }
//!
//! # Partner APIs reachable through the gateway but outside the upload fan-out.
//! partners:
//!   - name: crossmint
//!     base_url: "https://api.crossmint.io/v1/endpoint"
//!     auth_header: { name: x-client-secret }
//!     request: { input_field: payload }
//!     extraction:
//!       - { kind: raw }
//! ```
//!
//! ## Environment overrides
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `JWT_SECRET` | `auth.secret` |
//! | `DEV_MODE` | `dev_mode` (`1`, `true`, `yes` enable it) |
//! | `SOLANA_RECEIVER` | `payments.receiver` |
//! | `UPLOAD_DIR` | `storage.root` |
//! | `<PROVIDER>_API_KEY` | that provider's `api_key` |
//! | `<PROVIDER>_API_URL` | that provider's `base_url` |
//! | `<PROVIDER>_MAX_TOKENS` | that provider's `request.max_tokens` |
//!
//! `<PROVIDER>` is the provider or partner name upper-cased: `AI_ML`,
//! `MISTRAL`, `NEBIUS`, `CROSSMINT`.
//!
//! When loading through [`GatewayConfig::from_env`], the file is validated
//! only after the overrides are applied, so a file may leave `auth.secret`
//! empty and rely on `JWT_SECRET`.

use std::fs;
use std::path::{Path, PathBuf};

use auth::TokenConfig;
use providers::ProviderConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::FanoutPolicy;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "DOCGATE_CONFIG";

/// Errors that can occur when loading gateway configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("invalid value {value:?} for environment variable {var}")]
    InvalidEnv { var: String, value: String },
}

/// Top-level configuration for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub auth: TokenConfig,

    /// Enables the insecure dev-mode token bypass.
    #[serde(default)]
    pub dev_mode: bool,

    #[serde(default)]
    pub fanout: FanoutPolicy,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub payments: PaymentSettings,

    /// Analysis providers every upload is sent to.
    #[serde(default = "ProviderConfig::analysis_defaults")]
    pub providers: Vec<ProviderConfig>,

    /// Partner APIs that share the adapter but are not part of the fan-out.
    #[serde(default = "default_partners")]
    pub partners: Vec<ProviderConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            auth: TokenConfig::default(),
            dev_mode: false,
            fanout: FanoutPolicy::default(),
            storage: StorageSettings::default(),
            payments: PaymentSettings::default(),
            providers: ProviderConfig::analysis_defaults(),
            partners: default_partners(),
        }
    }
}

impl GatewayConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: GatewayConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `DOCGATE_CONFIG` (if set) and apply process environment overrides.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::load(
            std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from),
            |var| std::env::var(var).ok(),
        )
    }

    /// Read `path` (or start from defaults), apply overrides, then validate once.
    pub fn load<F>(path: Option<PathBuf>, lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Look up a configured partner by name.
    pub fn partner(&self, name: &str) -> Option<&ProviderConfig> {
        self.partners.iter().find(|p| p.name == name)
    }

    /// Apply the flat environment overrides, reading variables through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.secret = secret;
        }
        if let Some(flag) = lookup("DEV_MODE") {
            self.dev_mode = parse_flag(&flag);
        }
        if let Some(receiver) = lookup("SOLANA_RECEIVER") {
            self.payments.receiver = receiver;
        }
        if let Some(root) = lookup("UPLOAD_DIR") {
            self.storage.root = PathBuf::from(root);
        }

        for provider in self.providers.iter_mut().chain(self.partners.iter_mut()) {
            let prefix = provider.name.to_ascii_uppercase();

            if let Some(key) = lookup(&format!("{prefix}_API_KEY")) {
                provider.api_key = Some(key);
            }
            if let Some(url) = lookup(&format!("{prefix}_API_URL")) {
                provider.base_url = url;
            }
            let var = format!("{prefix}_MAX_TOKENS");
            if let Some(raw) = lookup(&var) {
                let max_tokens = raw
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ConfigLoadError::InvalidEnv { var, value: raw })?;
                provider.request.max_tokens = Some(max_tokens);
            }
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.auth
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;

        if self.providers.is_empty() {
            return Err(ConfigLoadError::Validation(
                "at least one provider must be configured".to_string(),
            ));
        }
        let mut names: Vec<&str> = self
            .providers
            .iter()
            .chain(&self.partners)
            .map(|p| p.name.as_str())
            .collect();
        names.sort_unstable();
        if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(ConfigLoadError::Validation(format!(
                "duplicate provider name: {}",
                dup[0]
            )));
        }
        for provider in self.providers.iter().chain(&self.partners) {
            provider
                .validate()
                .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        }

        if self.storage.root.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "storage.root must not be empty".to_string(),
            ));
        }
        if self.payments.receiver.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "payments.receiver must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where uploaded artifacts are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

impl StorageSettings {
    pub fn docs_dir(&self) -> PathBuf {
        self.root.join("docs")
    }

    pub fn payments_dir(&self) -> PathBuf {
        self.root.join("payments")
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

/// Payment reference defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSettings {
    #[serde(default = "default_receiver")]
    pub receiver: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            receiver: default_receiver(),
            currency: default_currency(),
        }
    }
}

fn default_partners() -> Vec<ProviderConfig> {
    vec![ProviderConfig::crossmint()]
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_receiver() -> String {
    "DemoReceiver1".to_string()
}

fn default_currency() -> String {
    "SOL".to_string()
}
