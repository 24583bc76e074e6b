use api_types::ErrorResponse;
use axum::{Json, http::StatusCode, response::IntoResponse};
use ledger::{ErrorClass, LedgerError};
use thiserror::Error;

pub use server::{ServerState, router, run, run_with_listener};

mod coins;
mod credentials;
mod info;
mod server;
mod store;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("invalid credentials")]
    Unauthorized,
    #[error("credential store failure: {0}")]
    Credentials(sea_orm::DbErr),
    #[error("{0}")]
    Generic(String),
}

fn status_for_ledger_error(err: &LedgerError) -> StatusCode {
    match err.class() {
        ErrorClass::Validation => StatusCode::BAD_REQUEST,
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::BusinessRule => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorClass::Infrastructure => match err {
            LedgerError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

fn message_for_ledger_error(err: LedgerError) -> String {
    match err.class() {
        ErrorClass::Infrastructure => {
            tracing::error!("ledger failure: {err}");
            match err {
                LedgerError::Timeout(_) => "request timed out".to_string(),
                _ => "internal server error".to_string(),
            }
        }
        _ => err.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, errors) = match self {
            ServerError::Ledger(err) => (status_for_ledger_error(&err), message_for_ledger_error(err)),
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "invalid credentials".to_string()),
            ServerError::Credentials(err) => {
                tracing::error!("credential store failure: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorResponse { errors })).into_response()
    }
}
