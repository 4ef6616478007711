//! Account management (§4.B): every mutation and lookup is gated on the
//! role floor from the operation table before touching `account_repo`.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::domain::{Account, AccountType, Role};
use crate::error::LedgerError;
use crate::repos::account_repo;

#[allow(clippy::too_many_arguments)]
pub async fn create_account(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    name: &str,
    account_type: AccountType,
    currency_code: &str,
    parent_account_id: Option<Uuid>,
    description: Option<&str>,
) -> Result<Account, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::Member).await?;

    let account = account_repo::save_account(
        pool,
        workplace_id,
        name,
        account_type,
        currency_code,
        parent_account_id,
        description,
    )
    .await?;

    tracing::info!(
        workplace_id = %workplace_id,
        account_id = %account.id,
        "account created"
    );

    Ok(account)
}

pub async fn get_account(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    account_id: Uuid,
) -> Result<Account, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::ReadOnly).await?;

    account_repo::find_by_id(pool, workplace_id, account_id)
        .await?
        .ok_or_else(|| LedgerError::account_not_found(account_id))
}

pub async fn list_accounts(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Account>, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::ReadOnly).await?;

    account_repo::list_accounts(pool, workplace_id, limit, offset).await
}

/// Batch lookup, keyed by id, for callers resolving a set of account
/// references (e.g. a journal's lines) in one round trip.
pub async fn get_accounts_by_ids(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    account_ids: &[Uuid],
) -> Result<HashMap<Uuid, Account>, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::ReadOnly).await?;

    let accounts = account_repo::find_by_ids(pool, workplace_id, account_ids).await?;
    Ok(accounts.into_iter().map(|a| (a.id, a)).collect())
}

pub async fn update_account(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    account_id: Uuid,
    name: &str,
    currency_code: &str,
    description: Option<&str>,
) -> Result<Account, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::Member).await?;

    let account =
        account_repo::update_account(pool, workplace_id, account_id, name, currency_code, description)
            .await?;

    tracing::info!(
        workplace_id = %workplace_id,
        account_id = %account.id,
        "account updated"
    );

    Ok(account)
}

pub async fn deactivate_account(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    account_id: Uuid,
) -> Result<Account, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::Member).await?;

    let account = account_repo::deactivate_account(pool, workplace_id, account_id).await?;

    tracing::info!(
        workplace_id = %workplace_id,
        account_id = %account.id,
        "account deactivated"
    );

    Ok(account)
}
