use std::error::Error;

use clap::{Args, Parser, Subcommand};
use ledger::{Direction, Ledger, LedgerConfig, PurchaseCmd, TransferCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "merch_admin")]
#[command(about = "Operator utilities for the merch store ledger")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./merch_store.db?mode=rwc"
    )]
    database_url: String,

    /// Coins granted to accounts provisioned by this tool.
    #[arg(long, env = "MERCH__LEDGER__STARTING_BALANCE", default_value_t = 1000)]
    starting_balance: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Account(Account),
    /// Move coins between two accounts.
    Transfer(TransferArgs),
    /// Buy catalog items for an account.
    Buy(BuyArgs),
    /// List the catalog.
    Catalog,
    /// Coins in circulation and coins spent on merch.
    Supply,
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Provision(IdentityArgs),
    Show(IdentityArgs),
}

#[derive(Args, Debug)]
struct IdentityArgs {
    #[arg(long)]
    identity: String,
}

#[derive(Args, Debug)]
struct TransferArgs {
    #[arg(long)]
    from: String,
    #[arg(long)]
    to: String,
    #[arg(long)]
    amount: i64,
}

#[derive(Args, Debug)]
struct BuyArgs {
    #[arg(long)]
    identity: String,
    #[arg(long)]
    item: String,
    #[arg(long, default_value_t = 1)]
    quantity: i64,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn show_account(ledger: &Ledger, identity: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let info = ledger.account_info(identity).await?;
    println!("{}: {} coins", info.identity, info.balance);

    println!("inventory:");
    for item in &info.inventory {
        println!("  {:<12} x{}", item.item_type, item.quantity);
    }

    println!("transfers:");
    for entry in ledger.transfer_history(identity).await? {
        let arrow = match entry.direction {
            Direction::Sent => "->",
            Direction::Received => "<-",
        };
        println!(
            "  {} {arrow} {:<12} {:>6}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.counterparty,
            entry.amount
        );
    }

    println!("purchases:");
    for purchase in ledger.purchase_history(identity).await? {
        println!(
            "  {} {:<12} x{} for {}",
            purchase.created_at.format("%Y-%m-%d %H:%M:%S"),
            purchase.item_type,
            purchase.quantity,
            purchase.total_cost
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let ledger = Ledger::builder()
        .database(db)
        .config(LedgerConfig::default().starting_balance(cli.starting_balance))
        .build()
        .await?;

    match cli.command {
        Command::Account(Account {
            command: AccountCommand::Provision(args),
        }) => {
            let account = ledger.provision(&args.identity).await?;
            println!("account {}: {} coins", account.identity, account.balance);
        }
        Command::Account(Account {
            command: AccountCommand::Show(args),
        }) => {
            show_account(&ledger, &args.identity).await?;
        }
        Command::Transfer(args) => {
            let record = ledger
                .transfer(TransferCmd::new(args.from, args.to, args.amount))
                .await?;
            println!(
                "transferred {} from {} to {} ({})",
                record.amount, record.sender, record.receiver, record.id
            );
        }
        Command::Buy(args) => {
            let record = ledger
                .purchase(PurchaseCmd::new(args.identity, args.item).quantity(args.quantity))
                .await?;
            println!(
                "{} bought {} x{} for {}",
                record.identity, record.item_type, record.quantity, record.total_cost
            );
        }
        Command::Catalog => {
            for item in ledger.catalog().await? {
                println!("{:<12} {:>5}", item.item_type, item.price);
            }
        }
        Command::Supply => {
            let supply = ledger.supply().await?;
            let spent = ledger.total_spent().await?;
            println!("in circulation: {supply}");
            println!("spent on merch: {spent}");
            println!("granted:        {}", supply + spent);
        }
    }

    Ok(())
}
