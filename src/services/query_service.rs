//! Read-side query layer (§4.G): journal/transaction lookups and the
//! materialized-vs-audit balance check, all gated on `READ_ONLY`.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::domain::{Account, Journal, Role, Transaction as LedgerTransaction};
use crate::error::LedgerError;
use crate::pagination::{self, JournalCursor, TransactionCursor};
use crate::repos::{account_repo, journal_repo};
use crate::services::balance_deltas::sign;

pub struct JournalWithTransactions {
    pub journal: Journal,
    pub transactions: Vec<LedgerTransaction>,
}

pub async fn get_journal(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    journal_id: Uuid,
) -> Result<JournalWithTransactions, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::ReadOnly).await?;

    let journal = journal_repo::find_journal_by_id(pool, workplace_id, journal_id)
        .await?
        .ok_or_else(|| LedgerError::journal_not_found(journal_id))?;

    let transactions = journal_repo::find_transactions_by_journal_id(pool, journal_id).await?;

    Ok(JournalWithTransactions {
        journal,
        transactions,
    })
}

pub struct ListJournalsRequest {
    pub limit: Option<i64>,
    pub next_token: Option<String>,
    pub include_reversals: bool,
    pub include_transactions: bool,
}

pub struct ListJournalsPage {
    pub journals: Vec<Journal>,
    pub transactions_by_journal: HashMap<Uuid, Vec<LedgerTransaction>>,
}

pub async fn list_journals(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    request: ListJournalsRequest,
) -> Result<ListJournalsPage, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::ReadOnly).await?;

    let limit = pagination::normalize_limit(request.limit);
    let cursor = request
        .next_token
        .as_deref()
        .map(JournalCursor::decode)
        .transpose()?;

    let journals = journal_repo::list_journals_by_workplace(
        pool,
        workplace_id,
        limit,
        cursor,
        request.include_reversals,
    )
    .await?;

    let transactions_by_journal = if request.include_transactions && !journals.is_empty() {
        let journal_ids: Vec<Uuid> = journals.iter().map(|j| j.id).collect();
        let all = journal_repo::find_transactions_by_journal_ids(pool, &journal_ids).await?;
        let mut grouped: HashMap<Uuid, Vec<LedgerTransaction>> = HashMap::new();
        for t in all {
            grouped.entry(t.journal_id).or_default().push(t);
        }
        grouped
    } else {
        HashMap::new()
    };

    Ok(ListJournalsPage {
        journals,
        transactions_by_journal,
    })
}

pub async fn list_transactions(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    account_id: Uuid,
    limit: Option<i64>,
    next_token: Option<String>,
) -> Result<Vec<LedgerTransaction>, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::ReadOnly).await?;

    let limit = pagination::normalize_limit(limit);
    let cursor = next_token
        .as_deref()
        .map(TransactionCursor::decode)
        .transpose()?;

    journal_repo::list_transactions_by_account(pool, account_id, limit, cursor).await
}

/// Returns the materialized balance after asserting it agrees with the
/// independently re-derived sum over every transaction on the account
/// (§4.G, §9 decision 4). A mismatch is a data-integrity `Internal` error.
pub async fn calculate_balance(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    account_id: Uuid,
) -> Result<Decimal, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::ReadOnly).await?;

    let account: Account = account_repo::find_by_id(pool, workplace_id, account_id)
        .await?
        .ok_or_else(|| LedgerError::account_not_found(account_id))?;

    let audited = audit_balance(pool, &account).await?;

    if audited != account.balance {
        return Err(LedgerError::Internal(format!(
            "materialized balance {} for account {} disagrees with audited balance {}",
            account.balance, account_id, audited
        )));
    }

    Ok(account.balance)
}

async fn audit_balance(pool: &PgPool, account: &Account) -> Result<Decimal, LedgerError> {
    let mut total = Decimal::ZERO;
    let mut cursor: Option<TransactionCursor> = None;

    loop {
        let page =
            journal_repo::list_transactions_by_account(pool, account.id, 100, cursor).await?;
        if page.is_empty() {
            break;
        }

        for t in &page {
            total += sign(account.account_type, t.transaction_type)? * t.amount;
        }

        let last = page.last().unwrap();
        if page.len() < 100 {
            break;
        }
        cursor = Some(TransactionCursor {
            account_id: account.id,
            transaction_date: last.transaction_date,
            created_at: last.created_at,
            id: last.id,
        });
    }

    Ok(total)
}
