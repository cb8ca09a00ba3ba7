//! Development-mode authentication bypass.
//!
//! **Insecure.** When enabled, anyone presenting the sentinel transaction
//! signature receives a long-lived token for any wallet they name. No
//! payment or signature is checked. Disabled unless explicitly turned on.
use tracing::warn;

use crate::error::AuthError;
use crate::token::TokenIssuer;

/// Transaction signature accepted by the bypass.
pub const DEV_SENTINEL: &str = "dev-ok";

/// Gate for the dev-mode token shortcut.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DevBypass {
    enabled: bool,
}

impl DevBypass {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Log a loud warning when the bypass is live. Call once at startup.
    pub fn announce(&self) {
        if self.enabled {
            warn!(
                sentinel = DEV_SENTINEL,
                "DEV MODE AUTH BYPASS ENABLED: tokens are issued without payment verification. \
                 Never run this configuration in production."
            );
        }
    }

    /// Issue a long-lived token for `wallet` when the bypass accepts `tx_signature`.
    pub fn issue(
        &self,
        issuer: &TokenIssuer,
        tx_signature: &str,
        wallet: &str,
    ) -> Result<String, AuthError> {
        if !self.enabled || tx_signature != DEV_SENTINEL {
            return Err(AuthError::DevBypassRefused {
                sentinel: DEV_SENTINEL,
            });
        }

        warn!(wallet = %wallet, "issuing dev-mode bypass token");
        issuer.issue_default(wallet, true)
    }
}
