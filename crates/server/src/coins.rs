//! Coin transfer endpoint

use api_types::coins::SendCoinRequest;
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use ledger::{Account, TransferCmd};

use crate::{ServerError, server::ServerState};

/// Handle requests for sending coins to another employee
pub async fn send(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    payload: Result<Json<SendCoinRequest>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let Json(payload) = payload.map_err(|rejection| ServerError::Generic(rejection.body_text()))?;

    state
        .ledger
        .transfer(TransferCmd::new(
            account.identity,
            payload.to_user,
            payload.amount,
        ))
        .await?;

    Ok(StatusCode::OK)
}
