//! Repository for ledger accounts (§4.A).

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Account, AccountType};
use crate::error::LedgerError;

/// Find an account by id, scoped to a workplace. Returns `Ok(None)` rather
/// than an error on miss — callers decide whether a miss means `NotFound`.
pub async fn find_by_id(
    pool: &PgPool,
    workplace_id: Uuid,
    account_id: Uuid,
) -> Result<Option<Account>, LedgerError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, workplace_id, name, account_type, currency_code, parent_account_id,
               description, is_active, balance, created_at, updated_at
        FROM accounts
        WHERE id = $1 AND workplace_id = $2
        "#,
    )
    .bind(account_id)
    .bind(workplace_id)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

/// Find an account by id within a transaction, taking a row-level write lock.
/// Used by the posting and reversal pipelines before mutating `balance`.
pub async fn find_by_id_for_update(
    tx: &mut Transaction<'_, Postgres>,
    workplace_id: Uuid,
    account_id: Uuid,
) -> Result<Option<Account>, LedgerError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, workplace_id, name, account_type, currency_code, parent_account_id,
               description, is_active, balance, created_at, updated_at
        FROM accounts
        WHERE id = $1 AND workplace_id = $2
        FOR UPDATE
        "#,
    )
    .bind(account_id)
    .bind(workplace_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(account)
}

/// Batch-fetch accounts by id, scoped to a workplace. Rows for ids that don't
/// exist or belong to another workplace are simply absent from the result —
/// callers must check every requested id came back.
pub async fn find_by_ids(
    pool: &PgPool,
    workplace_id: Uuid,
    account_ids: &[Uuid],
) -> Result<Vec<Account>, LedgerError> {
    let accounts = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, workplace_id, name, account_type, currency_code, parent_account_id,
               description, is_active, balance, created_at, updated_at
        FROM accounts
        WHERE workplace_id = $1 AND id = ANY($2)
        "#,
    )
    .bind(workplace_id)
    .bind(account_ids)
    .fetch_all(pool)
    .await?;

    Ok(accounts)
}

/// Row-lock and batch-fetch accounts within an open transaction, in ascending
/// id order, so two concurrent posts touching overlapping account sets always
/// acquire their locks in the same order and cannot deadlock each other.
pub async fn find_by_ids_for_update(
    tx: &mut Transaction<'_, Postgres>,
    workplace_id: Uuid,
    account_ids: &[Uuid],
) -> Result<Vec<Account>, LedgerError> {
    let mut sorted_ids = account_ids.to_vec();
    sorted_ids.sort();
    sorted_ids.dedup();

    let accounts = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, workplace_id, name, account_type, currency_code, parent_account_id,
               description, is_active, balance, created_at, updated_at
        FROM accounts
        WHERE workplace_id = $1 AND id = ANY($2)
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(workplace_id)
    .bind(&sorted_ids)
    .fetch_all(&mut **tx)
    .await?;

    Ok(accounts)
}

pub async fn list_accounts(
    pool: &PgPool,
    workplace_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Account>, LedgerError> {
    let accounts = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, workplace_id, name, account_type, currency_code, parent_account_id,
               description, is_active, balance, created_at, updated_at
        FROM accounts
        WHERE workplace_id = $1
        ORDER BY name
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(workplace_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(accounts)
}

pub async fn save_account(
    pool: &PgPool,
    workplace_id: Uuid,
    name: &str,
    account_type: AccountType,
    currency_code: &str,
    parent_account_id: Option<Uuid>,
    description: Option<&str>,
) -> Result<Account, LedgerError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts
            (id, workplace_id, name, account_type, currency_code, parent_account_id,
             description, is_active, balance, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, true, 0, $8, $8)
        RETURNING id, workplace_id, name, account_type, currency_code, parent_account_id,
                  description, is_active, balance, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(workplace_id)
    .bind(name)
    .bind(account_type)
    .bind(currency_code)
    .bind(parent_account_id)
    .bind(description)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(account)
}

/// Update an account's mutable fields. `currency_code` may only change while
/// the account has never been posted to (§3 invariant, §9 open question 1).
pub async fn update_account(
    pool: &PgPool,
    workplace_id: Uuid,
    account_id: Uuid,
    name: &str,
    currency_code: &str,
    description: Option<&str>,
) -> Result<Account, LedgerError> {
    // The currency-immutability check and the write must observe the same
    // row lock a concurrent `post_journal` takes via `find_by_ids_for_update`,
    // otherwise a posting can commit between the check and the update and
    // slip a currency change past an account that just gained its first line.
    let mut tx = pool.begin().await?;

    let current = find_by_id_for_update(&mut tx, workplace_id, account_id)
        .await?
        .ok_or_else(|| LedgerError::account_not_found(account_id))?;

    if current.currency_code != currency_code {
        let has_postings: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE account_id = $1)",
        )
        .bind(account_id)
        .fetch_one(&mut *tx)
        .await?;

        if has_postings {
            return Err(LedgerError::Validation(
                "currency_code is immutable once an account has postings".to_string(),
            ));
        }
    }

    let account = sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET name = $3, currency_code = $4, description = $5, updated_at = $6
        WHERE id = $1 AND workplace_id = $2
        RETURNING id, workplace_id, name, account_type, currency_code, parent_account_id,
                  description, is_active, balance, created_at, updated_at
        "#,
    )
    .bind(account_id)
    .bind(workplace_id)
    .bind(name)
    .bind(currency_code)
    .bind(description)
    .bind(Utc::now())
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| LedgerError::account_not_found(account_id))?;

    tx.commit().await?;

    Ok(account)
}

/// Deactivate an account. Blocks new postings but not reads (§3 invariant).
pub async fn deactivate_account(
    pool: &PgPool,
    workplace_id: Uuid,
    account_id: Uuid,
) -> Result<Account, LedgerError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET is_active = false, updated_at = $3
        WHERE id = $1 AND workplace_id = $2
        RETURNING id, workplace_id, name, account_type, currency_code, parent_account_id,
                  description, is_active, balance, created_at, updated_at
        "#,
    )
    .bind(account_id)
    .bind(workplace_id)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| LedgerError::account_not_found(account_id))?;

    Ok(account)
}

/// Apply a signed delta to an account's materialized balance under the
/// caller's open transaction and return the post-delta balance. The caller
/// must already hold the row lock (via `find_by_ids_for_update`).
pub async fn apply_balance_delta(
    tx: &mut Transaction<'_, Postgres>,
    account_id: Uuid,
    delta: Decimal,
) -> Result<Decimal, LedgerError> {
    let new_balance: Decimal = sqlx::query_scalar(
        r#"
        UPDATE accounts
        SET balance = balance + $2, updated_at = now()
        WHERE id = $1
        RETURNING balance
        "#,
    )
    .bind(account_id)
    .bind(delta)
    .fetch_one(&mut **tx)
    .await?;

    Ok(new_balance)
}
