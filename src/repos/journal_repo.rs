//! Repository for journals and their transaction lines (§4.A, §4.E, §4.F).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{
    AccountType, Journal, JournalStatus, Transaction as LedgerTransaction, TransactionInput,
};
use crate::error::LedgerError;
use crate::pagination::JournalCursor;
use crate::repos::account_repo;
use crate::services::balance_deltas::sign;

pub async fn find_journal_by_id(
    pool: &PgPool,
    workplace_id: Uuid,
    journal_id: Uuid,
) -> Result<Option<Journal>, LedgerError> {
    let journal = sqlx::query_as::<_, Journal>(
        r#"
        SELECT id, workplace_id, journal_date, description, currency_code, amount, status,
               original_journal_id, reversing_journal_id, created_at, updated_at
        FROM journals
        WHERE id = $1 AND workplace_id = $2
        "#,
    )
    .bind(journal_id)
    .bind(workplace_id)
    .fetch_optional(pool)
    .await?;

    Ok(journal)
}

/// Load a journal by id and row-lock it within an open transaction. Used by
/// the reversal pipeline before flipping its status.
pub async fn find_journal_by_id_for_update(
    tx: &mut Transaction<'_, Postgres>,
    workplace_id: Uuid,
    journal_id: Uuid,
) -> Result<Option<Journal>, LedgerError> {
    let journal = sqlx::query_as::<_, Journal>(
        r#"
        SELECT id, workplace_id, journal_date, description, currency_code, amount, status,
               original_journal_id, reversing_journal_id, created_at, updated_at
        FROM journals
        WHERE id = $1 AND workplace_id = $2
        FOR UPDATE
        "#,
    )
    .bind(journal_id)
    .bind(workplace_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(journal)
}

pub async fn find_transactions_by_journal_id(
    pool: &PgPool,
    journal_id: Uuid,
) -> Result<Vec<LedgerTransaction>, LedgerError> {
    let transactions = sqlx::query_as::<_, LedgerTransaction>(
        r#"
        SELECT id, journal_id, account_id, amount, transaction_type, currency_code, notes,
               transaction_date, running_balance, created_at
        FROM transactions
        WHERE journal_id = $1
        ORDER BY created_at
        "#,
    )
    .bind(journal_id)
    .fetch_all(pool)
    .await?;

    Ok(transactions)
}

/// Transaction-scoped twin of `find_transactions_by_journal_id`, for callers
/// (the reversal pipeline) that already hold `tx` and must read the original
/// lines without checking out a second pool connection.
pub async fn find_transactions_by_journal_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    journal_id: Uuid,
) -> Result<Vec<LedgerTransaction>, LedgerError> {
    let transactions = sqlx::query_as::<_, LedgerTransaction>(
        r#"
        SELECT id, journal_id, account_id, amount, transaction_type, currency_code, notes,
               transaction_date, running_balance, created_at
        FROM transactions
        WHERE journal_id = $1
        ORDER BY created_at
        "#,
    )
    .bind(journal_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(transactions)
}

/// Batch version of `find_transactions_by_journal_id`, for `ListJournals(include_transactions=true)`.
pub async fn find_transactions_by_journal_ids(
    pool: &PgPool,
    journal_ids: &[Uuid],
) -> Result<Vec<LedgerTransaction>, LedgerError> {
    let transactions = sqlx::query_as::<_, LedgerTransaction>(
        r#"
        SELECT id, journal_id, account_id, amount, transaction_type, currency_code, notes,
               transaction_date, running_balance, created_at
        FROM transactions
        WHERE journal_id = ANY($1)
        ORDER BY journal_id, created_at
        "#,
    )
    .bind(journal_ids)
    .fetch_all(pool)
    .await?;

    Ok(transactions)
}

pub async fn list_journals_by_workplace(
    pool: &PgPool,
    workplace_id: Uuid,
    limit: i64,
    cursor: Option<JournalCursor>,
    include_reversals: bool,
) -> Result<Vec<Journal>, LedgerError> {
    let journals = match cursor {
        Some(c) => {
            sqlx::query_as::<_, Journal>(
                r#"
                SELECT id, workplace_id, journal_date, description, currency_code, amount, status,
                       original_journal_id, reversing_journal_id, created_at, updated_at
                FROM journals
                WHERE workplace_id = $1
                  AND ($5 OR status != 'REVERSED')
                  AND (journal_date, created_at, id) < ($2, $3, $4)
                ORDER BY journal_date DESC, created_at DESC, id DESC
                LIMIT $6
                "#,
            )
            .bind(workplace_id)
            .bind(c.journal_date)
            .bind(c.created_at)
            .bind(c.id)
            .bind(include_reversals)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Journal>(
                r#"
                SELECT id, workplace_id, journal_date, description, currency_code, amount, status,
                       original_journal_id, reversing_journal_id, created_at, updated_at
                FROM journals
                WHERE workplace_id = $1
                  AND ($2 OR status != 'REVERSED')
                ORDER BY journal_date DESC, created_at DESC, id DESC
                LIMIT $3
                "#,
            )
            .bind(workplace_id)
            .bind(include_reversals)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(journals)
}

pub async fn list_transactions_by_account(
    pool: &PgPool,
    account_id: Uuid,
    limit: i64,
    cursor: Option<crate::pagination::TransactionCursor>,
) -> Result<Vec<LedgerTransaction>, LedgerError> {
    let transactions = match cursor {
        Some(c) => {
            sqlx::query_as::<_, LedgerTransaction>(
                r#"
                SELECT id, journal_id, account_id, amount, transaction_type, currency_code, notes,
                       transaction_date, running_balance, created_at
                FROM transactions
                WHERE account_id = $1
                  AND (transaction_date, created_at, id) < ($2, $3, $4)
                ORDER BY transaction_date DESC, created_at DESC, id DESC
                LIMIT $5
                "#,
            )
            .bind(account_id)
            .bind(c.transaction_date)
            .bind(c.created_at)
            .bind(c.id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, LedgerTransaction>(
                r#"
                SELECT id, journal_id, account_id, amount, transaction_type, currency_code, notes,
                       transaction_date, running_balance, created_at
                FROM transactions
                WHERE account_id = $1
                ORDER BY transaction_date DESC, created_at DESC, id DESC
                LIMIT $2
                "#,
            )
            .bind(account_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(transactions)
}

/// Atomic write of a journal header plus its transaction lines (§4.E step 8,
/// §4.F step 8). The caller must already hold write locks on every account
/// referenced by `lines` (see `account_repo::find_by_ids_for_update`).
///
/// Applies each line's signed delta to its account in the order the lines
/// appear, so a line's `running_balance` reflects every prior line against
/// the same account within this journal, not just this journal's aggregate.
pub async fn save_journal(
    tx: &mut Transaction<'_, Postgres>,
    workplace_id: Uuid,
    journal_date: DateTime<Utc>,
    description: &str,
    currency_code: &str,
    amount: Decimal,
    original_journal_id: Option<Uuid>,
    lines: &[TransactionInput],
    account_types: &HashMap<Uuid, AccountType>,
) -> Result<(Journal, Vec<LedgerTransaction>), LedgerError> {
    let journal_id = Uuid::new_v4();
    let now = Utc::now();

    let journal = sqlx::query_as::<_, Journal>(
        r#"
        INSERT INTO journals
            (id, workplace_id, journal_date, description, currency_code, amount, status,
             original_journal_id, reversing_journal_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, 'POSTED', $7, NULL, $8, $8)
        RETURNING id, workplace_id, journal_date, description, currency_code, amount, status,
                  original_journal_id, reversing_journal_id, created_at, updated_at
        "#,
    )
    .bind(journal_id)
    .bind(workplace_id)
    .bind(journal_date)
    .bind(description)
    .bind(currency_code)
    .bind(amount)
    .bind(original_journal_id)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;

    let mut transactions = Vec::with_capacity(lines.len());

    for line in lines {
        let account_type = *account_types.get(&line.account_id).ok_or_else(|| {
            LedgerError::Internal(format!(
                "no account_type supplied for account {}",
                line.account_id
            ))
        })?;
        let delta = sign(account_type, line.transaction_type)? * line.amount;
        let running_balance = account_repo::apply_balance_delta(tx, line.account_id, delta).await?;

        let transaction = sqlx::query_as::<_, LedgerTransaction>(
            r#"
            INSERT INTO transactions
                (id, journal_id, account_id, amount, transaction_type, currency_code, notes,
                 transaction_date, running_balance, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, journal_id, account_id, amount, transaction_type, currency_code, notes,
                      transaction_date, running_balance, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(journal_id)
        .bind(line.account_id)
        .bind(line.amount)
        .bind(line.transaction_type)
        .bind(currency_code)
        .bind(&line.notes)
        .bind(line.transaction_date.unwrap_or(journal_date))
        .bind(running_balance)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;

        transactions.push(transaction);
    }

    Ok((journal, transactions))
}

/// Flip a journal to `REVERSED` and link it to its reversing counterpart
/// (§4.F step 9). Must run in the same transaction as the reversing journal's
/// `save_journal` call so neither write is ever visible without the other.
pub async fn update_journal_status_and_links(
    tx: &mut Transaction<'_, Postgres>,
    journal_id: Uuid,
    status: JournalStatus,
    reversing_journal_id: Uuid,
) -> Result<(), LedgerError> {
    let result = sqlx::query(
        r#"
        UPDATE journals
        SET status = $2, reversing_journal_id = $3, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(journal_id)
    .bind(status)
    .bind(reversing_journal_id)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(LedgerError::journal_not_found(journal_id));
    }

    Ok(())
}
