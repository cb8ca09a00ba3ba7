//! docgate server - HTTP front end for the document upload gateway
//!
//! This crate exposes the upload pipeline over HTTP. It supports:
//!
//! - **Document Upload**: bearer-token check, storage, concurrent fan-out to analysis providers
//! - **Dev Tokens**: the insecure dev-mode bypass, off unless configured
//! - **Payments**: payment reference creation
//! - **Events**: a server-sent heartbeat stream
//! - **Health & Metrics**: liveness and Prometheus metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docgate::GatewayConfig;
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     let gateway = GatewayConfig::from_env()?;
//!     server::start_server(config, gateway).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - Landing page (`<static_dir>/index.html` or a JSON banner)
//! - `GET /static/*` - Static assets
//! - `GET /health` - Liveness probe
//! - `GET /metrics` - Prometheus metrics
//! - `GET /sse` - Heartbeat event stream
//! - `GET /verify_dev` - Dev-mode token issuance
//! - `POST /create_payment` - Payment reference creation
//! - `POST /upload_document` - Authenticated upload and analysis (Bearer token required)

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
