//! Wire types of the merch store HTTP API.
//!
//! Field names follow the JSON the API has always spoken (`camelCase`, `type`
//! for item names), so the structs rename where Rust naming differs.

use serde::{Deserialize, Serialize};

pub mod info {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "camelCase")]
    pub struct InfoResponse {
        pub coins: i64,
        pub inventory: Vec<InventoryItem>,
        pub coin_history: CoinHistory,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    pub struct InventoryItem {
        #[serde(rename = "type")]
        pub item_type: String,
        pub quantity: i64,
    }

    /// Transfers of the caller, newest first in both lists.
    #[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
    pub struct CoinHistory {
        pub received: Vec<Received>,
        pub sent: Vec<Sent>,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "camelCase")]
    pub struct Received {
        pub from_user: String,
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "camelCase")]
    pub struct Sent {
        pub to_user: String,
        pub amount: i64,
    }
}

pub mod coins {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SendCoinRequest {
        pub to_user: String,
        pub amount: i64,
    }
}

pub mod catalog {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    pub struct CatalogEntry {
        #[serde(rename = "type")]
        pub item_type: String,
        pub price: i64,
    }
}

/// Body of every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: String,
}
