use crate::error::{ServerError, ServerResult};
use crate::metrics::record_payment;
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use docgate::PaymentRequest;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct CreatePaymentBody {
    pub wallet_address: String,
    #[serde(default = "default_rental_hours")]
    pub rental_hours: u32,
    #[serde(default = "default_amount")]
    pub amount: f64,
}

/// Create a payment reference for a wallet
pub async fn create_payment(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<CreatePaymentBody>, JsonRejection>,
) -> ServerResult<Json<PaymentRequest>> {
    let Json(body) = body?;

    if body.wallet_address.trim().is_empty() {
        return Err(ServerError::BadRequest(
            "wallet_address must not be empty".into(),
        ));
    }
    if !body.amount.is_finite() || body.amount < 0.0 {
        return Err(ServerError::BadRequest(format!(
            "amount must be a non-negative number, got {}",
            body.amount
        )));
    }

    let request = state
        .ledger
        .create(&body.wallet_address, body.rental_hours, body.amount)
        .await?;
    record_payment();
    Ok(Json(request))
}

fn default_rental_hours() -> u32 {
    1
}

fn default_amount() -> f64 {
    0.1
}
