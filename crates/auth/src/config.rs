//! Configuration for token issuance and verification.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Secret used when nothing else is configured. Fine for local runs only.
pub const DEFAULT_SECRET: &str = "dev-secret";

/// Runtime configuration for the token issuer.
///
/// Built once at startup and shared read-only. The secret is redacted from
/// `Debug` output so the struct can be logged.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenConfig {
    /// Shared HMAC secret.
    pub secret: String,
    /// Validity applied when a caller does not request a long-lived token.
    pub default_validity_hours: u64,
    /// Validity applied to long-lived (dev bypass) tokens.
    pub long_lived_hours: u64,
    /// Agent identifier stamped on tokens when the caller supplies none.
    pub default_agent_id: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            default_validity_hours: 1,
            long_lived_hours: 24,
            default_agent_id: "agent-default".to_string(),
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("default_validity_hours", &self.default_validity_hours)
            .field("long_lived_hours", &self.long_lived_hours)
            .field("default_agent_id", &self.default_agent_id)
            .finish()
    }
}

impl TokenConfig {
    /// Convenience constructor overriding only the secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }

    /// Reject configurations that could mint tokens with `exp <= iat`.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::InvalidConfig("secret must not be empty".into()));
        }
        if self.default_validity_hours == 0 {
            return Err(AuthError::InvalidConfig(
                "default_validity_hours must be >= 1".into(),
            ));
        }
        if self.long_lived_hours == 0 {
            return Err(AuthError::InvalidConfig(
                "long_lived_hours must be >= 1".into(),
            ));
        }
        Ok(())
    }

    /// True when the built-in development secret is still in use.
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}
