use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TokenConfig;
use crate::error::AuthError;

const SECONDS_PER_HOUR: i64 = 3600;

/// Identity assertion carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Wallet identifier the token was issued to.
    pub sub: String,
    /// Agent session identifier.
    pub agent_id: String,
    /// Issued-at, epoch seconds.
    pub iat: i64,
    /// Expiry, epoch seconds. Always greater than `iat`.
    pub exp: i64,
}

impl Claims {
    /// True when `now` is at or past the expiry.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Remaining lifetime in seconds, zero once expired.
    pub fn remaining_secs(&self, now: i64) -> i64 {
        (self.exp - now).max(0)
    }
}

/// Source of the current time in epoch seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Issues and verifies HS256 identity assertions.
///
/// Verification is stateless: there is no revocation list, and any token
/// carrying a valid signature and a future `exp` is accepted.
#[derive(Clone)]
pub struct TokenIssuer {
    config: TokenConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Build an issuer reading time from the system clock.
    pub fn new(config: TokenConfig) -> Result<Self, AuthError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build an issuer with an explicit clock.
    pub fn with_clock(config: TokenConfig, clock: Arc<dyn Clock>) -> Result<Self, AuthError> {
        config.validate()?;

        let secret = config.secret.as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our own clock so `now == exp` is rejected.
        validation.validate_exp = false;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Current time according to the issuer's clock.
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Build the claim set for a new token without signing it.
    pub fn claims_for(
        &self,
        subject: &str,
        agent_id: &str,
        validity_hours: u64,
        long_lived: bool,
    ) -> Result<Claims, AuthError> {
        let hours = if long_lived {
            self.config.long_lived_hours
        } else {
            validity_hours
        };
        if hours == 0 {
            return Err(AuthError::InvalidValidity(hours));
        }

        let hours = i64::try_from(hours).map_err(|_| AuthError::InvalidValidity(hours))?;
        let iat = self.clock.now();
        let exp = hours
            .checked_mul(SECONDS_PER_HOUR)
            .and_then(|secs| iat.checked_add(secs))
            .ok_or(AuthError::InvalidValidity(hours as u64))?;

        Ok(Claims {
            sub: subject.to_string(),
            agent_id: agent_id.to_string(),
            iat,
            exp,
        })
    }

    /// Sign a new token for `subject`.
    ///
    /// Long-lived tokens ignore `validity_hours` and use the configured
    /// long-lived window instead.
    pub fn issue(
        &self,
        subject: &str,
        agent_id: &str,
        validity_hours: u64,
        long_lived: bool,
    ) -> Result<String, AuthError> {
        let claims = self.claims_for(subject, agent_id, validity_hours, long_lived)?;
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        debug!(
            subject = %claims.sub,
            agent_id = %claims.agent_id,
            exp = claims.exp,
            long_lived,
            "issued token"
        );
        Ok(token)
    }

    /// Sign a token using the configured default agent id and validity.
    pub fn issue_default(&self, subject: &str, long_lived: bool) -> Result<String, AuthError> {
        self.issue(
            subject,
            &self.config.default_agent_id,
            self.config.default_validity_hours,
            long_lived,
        )
    }

    /// Decode and check a token, returning its claims unchanged.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        let claims = data.claims;

        let now = self.clock.now();
        if claims.is_expired_at(now) {
            return Err(AuthError::Expired {
                expired_at: claims.exp,
            });
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_735_689_600; // 2025-01-01T00:00:00Z

    fn issuer_at(secret: &str, now: i64) -> TokenIssuer {
        TokenIssuer::with_clock(TokenConfig::with_secret(secret), Arc::new(FixedClock(now)))
            .expect("valid config")
    }

    #[test]
    fn issue_then_verify_roundtrips_identity() {
        let issuer = issuer_at("s3cret", T0);
        let token = issuer.issue("demo-wallet", "agent-7", 2, false).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "demo-wallet");
        assert_eq!(claims.agent_id, "agent-7");
        assert_eq!(claims.iat, T0);
        assert_eq!(claims.exp, T0 + 2 * 3600);
    }

    #[test]
    fn token_expires_exactly_at_exp() {
        let token = issuer_at("s3cret", T0)
            .issue("demo-wallet", "agent", 1, false)
            .unwrap();

        let just_before = issuer_at("s3cret", T0 + 3599);
        assert!(just_before.verify(&token).is_ok());

        let at_expiry = issuer_at("s3cret", T0 + 3600);
        assert_eq!(
            at_expiry.verify(&token),
            Err(AuthError::Expired {
                expired_at: T0 + 3600
            })
        );

        let later = issuer_at("s3cret", T0 + 10 * 3600);
        assert!(matches!(
            later.verify(&token),
            Err(AuthError::Expired { .. })
        ));
    }

    #[test]
    fn long_lived_ignores_requested_hours() {
        let issuer = issuer_at("s3cret", T0);
        let claims = issuer.claims_for("w", "a", 1, true).unwrap();
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn other_secret_fails_signature() {
        let token = issuer_at("secret-a", T0)
            .issue("demo-wallet", "agent", 1, false)
            .unwrap();
        let result = issuer_at("secret-b", T0).verify(&token);
        assert_eq!(result, Err(AuthError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let issuer = issuer_at("s3cret", T0);
        assert!(matches!(
            issuer.verify("not-a-token"),
            Err(AuthError::Malformed(_))
        ));
        assert!(matches!(issuer.verify(""), Err(AuthError::Malformed(_))));
    }

    #[test]
    fn wrong_claim_shape_is_malformed() {
        #[derive(Serialize)]
        struct Partial {
            sub: String,
            exp: i64,
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &Partial {
                sub: "w".into(),
                exp: T0 + 60,
            },
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();

        let result = issuer_at("s3cret", T0).verify(&token);
        assert!(matches!(result, Err(AuthError::Malformed(_))));
    }

    #[test]
    fn zero_hour_validity_rejected() {
        let issuer = issuer_at("s3cret", T0);
        assert_eq!(
            issuer.issue("w", "a", 0, false),
            Err(AuthError::InvalidValidity(0))
        );
    }

    #[test]
    fn issue_default_uses_config_agent() {
        let issuer = issuer_at("s3cret", T0);
        let token = issuer.issue_default("demo-wallet", false).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.agent_id, "agent-default");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn remaining_secs_saturates() {
        let claims = Claims {
            sub: "w".into(),
            agent_id: "a".into(),
            iat: T0,
            exp: T0 + 10,
        };
        assert_eq!(claims.remaining_secs(T0), 10);
        assert_eq!(claims.remaining_secs(T0 + 50), 0);
    }
}
