//! Journal posting pipeline (§4.E): validates, authorizes, and atomically
//! writes a balanced journal plus its transaction lines.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::domain::{Journal, Role, Transaction as LedgerTransaction, TransactionInput};
use crate::error::LedgerError;
use crate::repos::{account_repo, journal_repo};
use crate::services::balance_deltas::{self, BalanceLine};

pub struct PostJournalRequest {
    pub journal_date: DateTime<Utc>,
    pub description: String,
    pub currency_code: String,
    pub transactions: Vec<TransactionInput>,
}

pub async fn post_journal(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    request: PostJournalRequest,
) -> Result<(Journal, Vec<LedgerTransaction>), LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::Member).await?;

    if request.description.trim().is_empty() {
        return Err(LedgerError::Validation(
            "description must not be empty".to_string(),
        ));
    }

    let balance_lines: Vec<BalanceLine> = request
        .transactions
        .iter()
        .map(|t| BalanceLine {
            account_id: t.account_id,
            amount: t.amount,
            transaction_type: t.transaction_type,
        })
        .collect();

    balance_deltas::validate_balance(&balance_lines)?;

    let account_ids: Vec<Uuid> = {
        let mut ids: Vec<Uuid> = request.transactions.iter().map(|t| t.account_id).collect();
        ids.sort();
        ids.dedup();
        ids
    };

    let mut tx = pool.begin().await?;

    let accounts = account_repo::find_by_ids_for_update(&mut tx, workplace_id, &account_ids).await?;
    if accounts.len() != account_ids.len() {
        let found: std::collections::HashSet<Uuid> = accounts.iter().map(|a| a.id).collect();
        let missing: Vec<Uuid> = account_ids
            .iter()
            .filter(|id| !found.contains(id))
            .copied()
            .collect();
        return Err(LedgerError::NotFound(format!(
            "account(s) not found: {}",
            missing
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    for account in &accounts {
        if !account.allows_posting() {
            return Err(LedgerError::Validation(format!(
                "account {} is inactive",
                account.id
            )));
        }
        if account.currency_code != request.currency_code {
            return Err(LedgerError::Validation(format!(
                "account {} currency {} does not match journal currency {}",
                account.id, account.currency_code, request.currency_code
            )));
        }
    }

    let account_types = accounts
        .iter()
        .map(|a| (a.id, a.account_type))
        .collect::<HashMap<_, _>>();

    // Per-account signed totals, computed here to audit what the pipeline is
    // about to post. `save_journal` below re-derives a delta per *line* (not
    // per account) as it writes each transaction, since `running_balance`
    // must reflect each line's position within the journal, not just this
    // journal's net effect on the account.
    let deltas = balance_deltas::compute_deltas(&balance_lines, &account_types)?;

    let amount = balance_deltas::journal_amount(&balance_lines);

    let (journal, transactions) = journal_repo::save_journal(
        &mut tx,
        workplace_id,
        request.journal_date,
        &request.description,
        &request.currency_code,
        amount,
        None,
        &request.transactions,
        &account_types,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        workplace_id = %workplace_id,
        journal_id = %journal.id,
        amount = %journal.amount,
        accounts_affected = deltas.len(),
        "journal posted"
    );

    Ok((journal, transactions))
}
