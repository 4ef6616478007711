//! Rebuild balances tool
//!
//! Admin-only tool that recomputes every account's materialized `balance`
//! for one workplace directly from its `transactions`, independent of the
//! incremental updates the posting and reversal pipelines perform. Treats
//! transactions as the source of truth and overwrites `accounts.balance`.
//!
//! # Usage
//! ```bash
//! rebuild_balances --workplace WORKPLACE_ID
//! ```

use std::collections::HashMap;
use std::env;

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use ledger_rs::domain::{AccountType, TransactionType};
use ledger_rs::services::balance_deltas::sign;

struct Args {
    workplace_id: Uuid,
}

impl Args {
    fn parse() -> Result<Self, String> {
        let args: Vec<String> = env::args().collect();
        if args.len() != 3 || args[1] != "--workplace" {
            return Err(format!(
                "Usage: {} --workplace WORKPLACE_ID",
                args.first().map(|s| s.as_str()).unwrap_or("rebuild_balances")
            ));
        }

        let workplace_id = args[2]
            .parse::<Uuid>()
            .map_err(|e| format!("invalid --workplace: {e}"))?;

        Ok(Args { workplace_id })
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to database");

    tracing::info!(workplace_id = %args.workplace_id, "starting balance rebuild");

    match rebuild_workplace_balances(&pool, args.workplace_id).await {
        Ok(count) => tracing::info!(accounts_rebuilt = count, "balance rebuild complete"),
        Err(e) => {
            tracing::error!(error = %e, "balance rebuild failed");
            std::process::exit(1);
        }
    }
}

async fn rebuild_workplace_balances(
    pool: &sqlx::PgPool,
    workplace_id: Uuid,
) -> Result<usize, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let accounts = sqlx::query_as::<_, (Uuid, AccountType)>(
        r#"
        SELECT id, account_type
        FROM accounts
        WHERE workplace_id = $1
        FOR UPDATE
        "#,
    )
    .bind(workplace_id)
    .fetch_all(&mut *tx)
    .await?;

    let account_types: HashMap<Uuid, AccountType> = accounts.iter().cloned().collect();

    let transactions = sqlx::query_as::<_, (Uuid, Decimal, TransactionType)>(
        r#"
        SELECT t.account_id, t.amount, t.transaction_type
        FROM transactions t
        JOIN accounts a ON a.id = t.account_id
        WHERE a.workplace_id = $1
        "#,
    )
    .bind(workplace_id)
    .fetch_all(&mut *tx)
    .await?;

    let mut totals: HashMap<Uuid, Decimal> = accounts.iter().map(|(id, _)| (*id, Decimal::ZERO)).collect();

    for (account_id, amount, tx_type) in transactions {
        let account_type = account_types[&account_id];
        let signed = sign(account_type, tx_type)
            .unwrap_or_else(|e| panic!("corrupted account type for {account_id}: {e}"))
            * amount;
        *totals.entry(account_id).or_insert(Decimal::ZERO) += signed;
    }

    let mut rebuilt = 0;
    for (account_id, balance) in &totals {
        sqlx::query("UPDATE accounts SET balance = $2, updated_at = now() WHERE id = $1")
            .bind(account_id)
            .bind(balance)
            .execute(&mut *tx)
            .await?;
        rebuilt += 1;
    }

    tx.commit().await?;

    Ok(rebuilt)
}
