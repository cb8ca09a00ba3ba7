use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use docgate::DEV_SENTINEL;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct VerifyDevParams {
    #[serde(default = "default_tx_signature")]
    pub tx_signature: String,
    #[serde(default = "default_wallet")]
    pub wallet_address: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyDevResponse {
    pub status: String,
    pub token: String,
}

/// Issue a long-lived token without payment verification (dev mode only)
pub async fn verify_dev(
    State(state): State<Arc<ServerState>>,
    params: Result<Query<VerifyDevParams>, QueryRejection>,
) -> ServerResult<Json<VerifyDevResponse>> {
    let Query(params) = params?;
    let token = state
        .dev
        .issue(&state.issuer, &params.tx_signature, &params.wallet_address)
        .map_err(ServerError::from)?;

    Ok(Json(VerifyDevResponse {
        status: "verified".to_string(),
        token,
    }))
}

fn default_tx_signature() -> String {
    DEV_SENTINEL.to_string()
}

fn default_wallet() -> String {
    "demo-wallet".to_string()
}
