use sea_orm::{Database, DatabaseConnection};

use ledger::{
    Direction, InventoryItem, Ledger, LedgerConfig, LedgerError, PurchaseCmd, TransferCmd,
};
use migration::MigratorTrait;

async fn ledger_with_config(config: LedgerConfig) -> (Ledger, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder()
        .database(db.clone())
        .config(config)
        .build()
        .await
        .unwrap();
    (ledger, db)
}

async fn ledger_with_db() -> (Ledger, DatabaseConnection) {
    ledger_with_config(LedgerConfig::default()).await
}

#[tokio::test]
async fn provision_grants_starting_balance_once() {
    let (ledger, _db) = ledger_with_db().await;

    let account = ledger.provision("alice").await.unwrap();
    assert_eq!(account.identity, "alice");
    assert_eq!(account.balance, 1000);

    ledger
        .purchase(PurchaseCmd::new("alice", "cup"))
        .await
        .unwrap();
    let again = ledger.provision("alice").await.unwrap();
    assert_eq!(again.balance, 980);
    assert_eq!(again.created_at, account.created_at);
}

#[tokio::test]
async fn provision_trims_and_rejects_empty_identity() {
    let (ledger, _db) = ledger_with_db().await;

    let account = ledger.provision("  bob ").await.unwrap();
    assert_eq!(account.identity, "bob");

    let err = ledger.provision("   ").await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidIdentity(_)));
    assert_eq!(ledger.supply().await.unwrap(), 1000);
}

#[tokio::test]
async fn balance_of_unknown_identity_fails() {
    let (ledger, _db) = ledger_with_db().await;
    let err = ledger.balance("ghost").await.unwrap_err();
    assert_eq!(err, LedgerError::UserNotFound("ghost".to_string()));
}

#[tokio::test]
async fn transfer_moves_coins_and_records_both_sides() {
    let (ledger, _db) = ledger_with_db().await;
    ledger.provision("alice").await.unwrap();
    ledger.provision("bob").await.unwrap();

    let record = ledger
        .transfer(TransferCmd::new("alice", "bob", 300))
        .await
        .unwrap();
    assert_eq!(record.sender, "alice");
    assert_eq!(record.receiver, "bob");
    assert_eq!(record.amount, 300);

    assert_eq!(ledger.balance("alice").await.unwrap(), 700);
    assert_eq!(ledger.balance("bob").await.unwrap(), 1300);

    let alice = ledger.transfer_history("alice").await.unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].direction, Direction::Sent);
    assert_eq!(alice[0].counterparty, "bob");
    assert_eq!(alice[0].amount, 300);

    let bob = ledger.transfer_history_split("bob").await.unwrap();
    assert!(bob.sent.is_empty());
    assert_eq!(bob.received.len(), 1);
    assert_eq!(bob.received[0].counterparty, "alice");
}

#[tokio::test]
async fn transfer_history_is_newest_first() {
    let (ledger, _db) = ledger_with_db().await;
    ledger.provision("alice").await.unwrap();
    ledger.provision("bob").await.unwrap();

    for amount in [10, 20, 30] {
        ledger
            .transfer(TransferCmd::new("alice", "bob", amount))
            .await
            .unwrap();
    }
    ledger
        .transfer(TransferCmd::new("bob", "alice", 5))
        .await
        .unwrap();

    let history = ledger.transfer_history_split("alice").await.unwrap();
    let sent: Vec<i64> = history.sent.iter().map(|entry| entry.amount).collect();
    assert_eq!(sent, vec![30, 20, 10]);
    assert_eq!(history.received.len(), 1);
    assert_eq!(history.received[0].amount, 5);
}

#[tokio::test]
async fn self_transfer_is_rejected_without_effects() {
    let (ledger, _db) = ledger_with_db().await;
    ledger.provision("alice").await.unwrap();

    let err = ledger
        .transfer(TransferCmd::new("alice", " alice ", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::SelfTransfer(_)));
    assert_eq!(ledger.balance("alice").await.unwrap(), 1000);
    assert!(ledger.transfer_history("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let (ledger, _db) = ledger_with_db().await;
    ledger.provision("alice").await.unwrap();
    ledger.provision("bob").await.unwrap();

    for amount in [0, -5] {
        let err = ledger
            .transfer(TransferCmd::new("alice", "bob", amount))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }
    assert_eq!(ledger.balance("alice").await.unwrap(), 1000);
    assert_eq!(ledger.balance("bob").await.unwrap(), 1000);
}

#[tokio::test]
async fn transfer_reports_missing_parties() {
    let (ledger, _db) = ledger_with_db().await;
    ledger.provision("alice").await.unwrap();

    let err = ledger
        .transfer(TransferCmd::new("ghost", "alice", 10))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::SenderNotFound("ghost".to_string()));

    let err = ledger
        .transfer(TransferCmd::new("alice", "ghost", 10))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::ReceiverNotFound("ghost".to_string()));
    assert_eq!(ledger.balance("alice").await.unwrap(), 1000);

    let err = ledger
        .transfer(TransferCmd::new("", "alice", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidIdentity(_)));
}

#[tokio::test]
async fn overdraft_transfer_leaves_state_unchanged() {
    let (ledger, _db) = ledger_with_db().await;
    ledger.provision("alice").await.unwrap();
    ledger.provision("bob").await.unwrap();

    let err = ledger
        .transfer(TransferCmd::new("alice", "bob", 1001))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds(_)));
    assert_eq!(ledger.balance("alice").await.unwrap(), 1000);
    assert_eq!(ledger.balance("bob").await.unwrap(), 1000);
    assert!(ledger.transfer_history("bob").await.unwrap().is_empty());

    // the whole balance can move
    ledger
        .transfer(TransferCmd::new("alice", "bob", 1000))
        .await
        .unwrap();
    assert_eq!(ledger.balance("alice").await.unwrap(), 0);
}

#[tokio::test]
async fn purchase_beyond_balance_is_atomic() {
    let (ledger, _db) = ledger_with_config(LedgerConfig::default().starting_balance(50)).await;
    ledger.provision("alice").await.unwrap();

    // two books cost 100
    let err = ledger
        .purchase(PurchaseCmd::new("alice", "book").quantity(2))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds(_)));
    assert_eq!(ledger.balance("alice").await.unwrap(), 50);
    assert!(ledger.inventory("alice").await.unwrap().is_empty());
    assert!(ledger.purchase_history("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn repeated_purchases_accumulate_in_one_entry() {
    let (ledger, _db) = ledger_with_db().await;
    ledger.provision("alice").await.unwrap();

    for _ in 0..2 {
        let record = ledger
            .purchase(PurchaseCmd::new("alice", "cup"))
            .await
            .unwrap();
        assert_eq!(record.quantity, 1);
        assert_eq!(record.total_cost, 20);
    }
    ledger
        .purchase(PurchaseCmd::new("alice", "pen").quantity(3))
        .await
        .unwrap();

    assert_eq!(ledger.balance("alice").await.unwrap(), 1000 - 40 - 30);
    assert_eq!(
        ledger.inventory("alice").await.unwrap(),
        vec![
            InventoryItem {
                item_type: "cup".to_string(),
                quantity: 2,
            },
            InventoryItem {
                item_type: "pen".to_string(),
                quantity: 3,
            },
        ]
    );

    let purchases = ledger.purchase_history("alice").await.unwrap();
    assert_eq!(purchases.len(), 3);
    assert_eq!(purchases[0].item_type, "pen");
    assert_eq!(purchases[0].total_cost, 30);
}

#[tokio::test]
async fn purchase_rejects_bad_input() {
    let (ledger, _db) = ledger_with_db().await;
    ledger.provision("alice").await.unwrap();

    let err = ledger
        .purchase(PurchaseCmd::new("alice", "yacht"))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::ItemNotFound("yacht".to_string()));

    let err = ledger
        .purchase(PurchaseCmd::new("ghost", "cup"))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::UserNotFound("ghost".to_string()));

    let err = ledger
        .purchase(PurchaseCmd::new("alice", "cup").quantity(0))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));

    let err = ledger
        .purchase(PurchaseCmd::new("alice", "pink-hoody").quantity(i64::MAX))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));

    assert_eq!(ledger.balance("alice").await.unwrap(), 1000);
    assert!(ledger.inventory("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_identity_has_empty_history() {
    let (ledger, _db) = ledger_with_db().await;
    assert!(ledger.inventory("ghost").await.unwrap().is_empty());
    assert!(ledger.transfer_history("ghost").await.unwrap().is_empty());
    assert!(ledger.purchase_history("ghost").await.unwrap().is_empty());

    let err = ledger.account_info("ghost").await.unwrap_err();
    assert_eq!(err, LedgerError::UserNotFound("ghost".to_string()));
}

#[tokio::test]
async fn account_info_collects_balance_inventory_and_history() {
    let (ledger, _db) = ledger_with_db().await;
    ledger.provision("alice").await.unwrap();
    ledger.provision("bob").await.unwrap();

    ledger
        .transfer(TransferCmd::new("alice", "bob", 100))
        .await
        .unwrap();
    ledger
        .transfer(TransferCmd::new("bob", "alice", 40))
        .await
        .unwrap();
    ledger
        .purchase(PurchaseCmd::new("alice", "t-shirt"))
        .await
        .unwrap();

    let info = ledger.account_info("alice").await.unwrap();
    assert_eq!(info.identity, "alice");
    assert_eq!(info.balance, 1000 - 100 + 40 - 80);
    assert_eq!(info.inventory.len(), 1);
    assert_eq!(info.inventory[0].item_type, "t-shirt");
    assert_eq!(info.history.sent.len(), 1);
    assert_eq!(info.history.sent[0].counterparty, "bob");
    assert_eq!(info.history.received.len(), 1);
    assert_eq!(info.history.received[0].amount, 40);
}

#[tokio::test]
async fn catalog_is_seeded_and_sorted_by_price() {
    let (ledger, _db) = ledger_with_db().await;

    let catalog = ledger.catalog().await.unwrap();
    assert_eq!(catalog.len(), 10);
    assert_eq!(catalog[0].item_type, "pen");
    assert_eq!(catalog[0].price, 10);
    assert_eq!(catalog[9].item_type, "pink-hoody");
    assert!(catalog.windows(2).all(|pair| pair[0].price <= pair[1].price));

    assert_eq!(ledger.price("hoody").await.unwrap(), 300);
    assert_eq!(
        ledger.price("yacht").await.unwrap_err(),
        LedgerError::ItemNotFound("yacht".to_string())
    );
}

#[tokio::test]
async fn supply_plus_spent_equals_everything_granted() {
    let (ledger, _db) = ledger_with_db().await;
    for name in ["alice", "bob", "carol"] {
        ledger.provision(name).await.unwrap();
    }

    ledger
        .transfer(TransferCmd::new("alice", "bob", 250))
        .await
        .unwrap();
    ledger
        .purchase(PurchaseCmd::new("bob", "hoody"))
        .await
        .unwrap();
    ledger
        .transfer(TransferCmd::new("bob", "carol", 700))
        .await
        .unwrap();
    ledger
        .purchase(PurchaseCmd::new("carol", "umbrella").quantity(2))
        .await
        .unwrap();

    let supply = ledger.supply().await.unwrap();
    let spent = ledger.total_spent().await.unwrap();
    assert_eq!(spent, 300 + 400);
    assert_eq!(supply + spent, 3 * 1000);
}
