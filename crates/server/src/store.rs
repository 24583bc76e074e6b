//! Merch catalog and purchase endpoints

use api_types::catalog::CatalogEntry;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use ledger::{Account, PurchaseCmd};

use crate::{ServerError, server::ServerState};

/// Handle requests for buying one unit of `item`
pub async fn buy(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(item): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .ledger
        .purchase(PurchaseCmd::new(account.identity, item))
        .await?;

    Ok(StatusCode::OK)
}

/// Handle requests for listing the catalog
pub async fn catalog(
    _: Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CatalogEntry>>, ServerError> {
    let items = state.ledger.catalog().await?;

    Ok(Json(
        items
            .into_iter()
            .map(|item| CatalogEntry {
                item_type: item.item_type,
                price: item.price,
            })
            .collect(),
    ))
}
