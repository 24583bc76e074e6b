use chrono::Utc;
use sea_orm::EntityTrait;

use crate::{
    LedgerError, ResultLedger, TransferCmd, TransferRecord, transfers,
    util::normalize_identity,
};

use super::Ledger;

impl Ledger {
    /// Move coins from one account to another.
    ///
    /// Debit, credit and the transfer record commit together. Both rows are
    /// locked in ascending identity order, so two transfers over the same pair
    /// in opposite directions can not deadlock.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultLedger<TransferRecord> {
        let cmd = TransferCmd {
            sender: normalize_identity(&cmd.sender, "sender")?,
            receiver: normalize_identity(&cmd.receiver, "receiver")?,
            amount: cmd.amount,
        };
        if cmd.amount <= 0 {
            return Err(LedgerError::InvalidAmount("amount must be > 0".to_string()));
        }
        if cmd.sender == cmd.receiver {
            return Err(LedgerError::SelfTransfer(
                "sender and receiver must differ".to_string(),
            ));
        }

        let record = self
            .run_scoped("transfer", || self.transfer_once(&cmd))
            .await?;
        tracing::debug!(
            sender = %record.sender,
            receiver = %record.receiver,
            amount = record.amount,
            "transfer committed"
        );
        Ok(record)
    }

    async fn transfer_once(&self, cmd: &TransferCmd) -> ResultLedger<TransferRecord> {
        let parties = [cmd.sender.as_str(), cmd.receiver.as_str()];
        let scope = self.open_scope(&parties).await?;
        let rows = self.lock_accounts(&scope, &parties).await?;

        let sender = rows
            .iter()
            .find(|row| row.username == cmd.sender)
            .ok_or_else(|| LedgerError::SenderNotFound(cmd.sender.clone()))?;
        let receiver = rows
            .iter()
            .find(|row| row.username == cmd.receiver)
            .ok_or_else(|| LedgerError::ReceiverNotFound(cmd.receiver.clone()))?;

        if sender.balance < cmd.amount {
            return Err(LedgerError::InsufficientFunds(format!(
                "{} has {}, transfer needs {}",
                cmd.sender, sender.balance, cmd.amount
            )));
        }
        if receiver.balance.checked_add(cmd.amount).is_none() {
            return Err(LedgerError::InvalidAmount(format!(
                "{} balance would overflow",
                cmd.receiver
            )));
        }

        self.debit(&scope, &cmd.sender, cmd.amount).await?;
        self.credit(&scope, &cmd.receiver, cmd.amount).await?;

        let record = TransferRecord::new(
            cmd.sender.clone(),
            cmd.receiver.clone(),
            cmd.amount,
            Utc::now(),
        );
        transfers::Entity::insert(transfers::ActiveModel::from(&record))
            .exec_without_returning(scope.tx())
            .await?;

        scope.commit().await?;
        Ok(record)
    }
}
