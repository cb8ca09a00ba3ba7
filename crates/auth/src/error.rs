//! Error types produced by the auth crate.
//!
//! Verification failures are split so callers can tell a forged token from
//! an expired one. The server collapses all of them into a 401, but the
//! message carried in the response keeps the distinction.
//!
//! | Error | Raised by | Description |
//! |-------|-----------|-------------|
//! | [`InvalidSignature`](AuthError::InvalidSignature) | verify | Signature does not match the shared secret |
//! | [`Expired`](AuthError::Expired) | verify | Current time is at or past the `exp` claim |
//! | [`Malformed`](AuthError::Malformed) | verify | Token cannot be decoded into the claim shape |
//! | [`InvalidValidity`](AuthError::InvalidValidity) | issue | Validity window would not place `exp` after `iat` |
//! | [`InvalidConfig`](AuthError::InvalidConfig) | construction | Secret or windows unusable |
//! | [`Signing`](AuthError::Signing) | issue | Encoder failure |
//! | [`DevBypassRefused`](AuthError::DevBypassRefused) | dev bypass | Flag disabled or sentinel mismatch |
use thiserror::Error;

/// Errors raised while issuing or verifying identity assertions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    /// The token was not signed with the configured secret.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token's `exp` claim is at or before the current time.
    #[error("token expired at {expired_at}")]
    Expired { expired_at: i64 },

    /// The token could not be parsed into the expected claims.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// A zero-hour validity window was requested.
    #[error("validity must be at least one hour, got {0}")]
    InvalidValidity(u64),

    /// Token configuration is unusable.
    #[error("invalid token config: {0}")]
    InvalidConfig(String),

    /// The signing backend rejected the claims.
    #[error("failed to sign token: {0}")]
    Signing(String),

    /// Dev-mode bypass was requested but is disabled or the sentinel did not match.
    #[error("only available in dev mode with tx_signature={sentinel}")]
    DevBypassRefused { sentinel: &'static str },
}

impl AuthError {
    /// Returns true for failures caused by the presented token rather than
    /// by server configuration.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidSignature | AuthError::Expired { .. } | AuthError::Malformed(_)
        )
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::Malformed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_message_names_timestamp() {
        let err = AuthError::Expired {
            expired_at: 1_700_000_000,
        };
        assert!(err.to_string().contains("1700000000"));
    }

    #[test]
    fn verification_failures_are_classified() {
        assert!(AuthError::InvalidSignature.is_verification_failure());
        assert!(AuthError::Expired { expired_at: 0 }.is_verification_failure());
        assert!(AuthError::Malformed("x".into()).is_verification_failure());
        assert!(!AuthError::InvalidValidity(0).is_verification_failure());
        assert!(!AuthError::Signing("x".into()).is_verification_failure());
    }

    #[test]
    fn dev_refusal_mentions_sentinel() {
        let err = AuthError::DevBypassRefused { sentinel: "dev-ok" };
        assert_eq!(
            err.to_string(),
            "only available in dev mode with tx_signature=dev-ok"
        );
    }
}
