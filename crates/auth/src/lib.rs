//! docgate auth layer
//!
//! Issues and verifies the short-lived identity assertions that gate
//! document uploads. A token binds a wallet identifier (`sub`) to an agent
//! session (`agent_id`) and carries `iat`/`exp` in epoch seconds, signed
//! with HS256 over a shared secret.
//!
//! ## Example
//!
//! ```
//! use auth::{TokenConfig, TokenIssuer};
//!
//! let issuer = TokenIssuer::new(TokenConfig::with_secret("change-me")).unwrap();
//! let token = issuer.issue("demo-wallet", "agent-default", 1, false).unwrap();
//!
//! let claims = issuer.verify(&token).unwrap();
//! assert_eq!(claims.sub, "demo-wallet");
//! ```
//!
//! The [`DevBypass`] gate mints long-lived tokens without any payment
//! check. It exists for local testing and is off unless configured.

mod config;
mod dev;
mod error;
mod token;

pub use crate::config::{TokenConfig, DEFAULT_SECRET};
pub use crate::dev::{DevBypass, DEV_SENTINEL};
pub use crate::error::AuthError;
pub use crate::token::{Claims, Clock, FixedClock, SystemClock, TokenIssuer};
