//! Account overview endpoint

use api_types::info::{CoinHistory, InfoResponse, InventoryItem, Received, Sent};
use axum::{Extension, Json, extract::State};
use ledger::Account;

use crate::{ServerError, server::ServerState};

/// Handle requests for the caller's coins, inventory and transfer history
pub async fn get(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<InfoResponse>, ServerError> {
    let info = state.ledger.account_info(&account.identity).await?;

    Ok(Json(InfoResponse {
        coins: info.balance,
        inventory: info
            .inventory
            .into_iter()
            .map(|item| InventoryItem {
                item_type: item.item_type,
                quantity: item.quantity,
            })
            .collect(),
        coin_history: CoinHistory {
            received: info
                .history
                .received
                .into_iter()
                .map(|entry| Received {
                    from_user: entry.counterparty,
                    amount: entry.amount,
                })
                .collect(),
            sent: info
                .history
                .sent
                .into_iter()
                .map(|entry| Sent {
                    to_user: entry.counterparty,
                    amount: entry.amount,
                })
                .collect(),
        },
    }))
}
