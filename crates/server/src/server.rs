use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::DatabaseConnection;

use std::{future::Future, sync::Arc};

use crate::{ServerError, coins, credentials, info, store};
use ledger::Ledger;

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
    pub db: DatabaseConnection,
}

/// Resolve the caller from HTTP Basic credentials and make sure it owns an
/// account. The provisioned `ledger::Account` is handed to the handlers as a
/// request extension.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(ServerError::Unauthorized);
    };
    let username = auth_header.username().trim();
    if username.is_empty() || auth_header.password().is_empty() {
        return Err(ServerError::Unauthorized);
    }

    let verified = credentials::verify_or_register(&state.db, username, auth_header.password())
        .await
        .map_err(ServerError::Credentials)?;
    if !verified {
        tracing::debug!(username, "rejected credentials");
        return Err(ServerError::Unauthorized);
    }

    let account = state.ledger.provision(username).await?;
    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/info", get(info::get))
        .route("/api/sendCoin", post(coins::send))
        .route("/api/buy/{item}", get(store::buy))
        .route("/api/catalog", get(store::catalog))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn run<F>(
    ledger: Arc<Ledger>,
    db: DatabaseConnection,
    addr: &str,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(ledger, db, listener, shutdown).await
}

pub async fn run_with_listener<F>(
    ledger: Arc<Ledger>,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState { ledger, db };

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
