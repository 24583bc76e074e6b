//! Command structs for ledger write operations.
//!
//! These types group the parameters of a transfer or a purchase so call sites
//! stay readable and the engine can replay a command after transient
//! contention without re-deriving its inputs.

/// Move `amount` coins from `sender` to `receiver`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferCmd {
    pub sender: String,
    pub receiver: String,
    pub amount: i64,
}

impl TransferCmd {
    #[must_use]
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: i64) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        }
    }
}

/// Buy `quantity` units of `item_type` for `identity`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseCmd {
    pub identity: String,
    pub item_type: String,
    pub quantity: i64,
}

impl PurchaseCmd {
    /// A single unit of `item_type`.
    #[must_use]
    pub fn new(identity: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            item_type: item_type.into(),
            quantity: 1,
        }
    }

    #[must_use]
    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }
}
