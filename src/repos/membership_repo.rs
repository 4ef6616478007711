//! Repository for workplace memberships — the authorization gate's backing store.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Role, UserWorkplace};
use crate::error::LedgerError;

pub async fn find(
    pool: &PgPool,
    user_id: &str,
    workplace_id: Uuid,
) -> Result<Option<UserWorkplace>, LedgerError> {
    let membership = sqlx::query_as::<_, UserWorkplace>(
        r#"
        SELECT user_id, workplace_id, role, joined_at
        FROM workplace_memberships
        WHERE user_id = $1 AND workplace_id = $2
        "#,
    )
    .bind(user_id)
    .bind(workplace_id)
    .fetch_optional(pool)
    .await?;

    Ok(membership)
}

pub async fn list_by_workplace(
    pool: &PgPool,
    workplace_id: Uuid,
) -> Result<Vec<UserWorkplace>, LedgerError> {
    let memberships = sqlx::query_as::<_, UserWorkplace>(
        r#"
        SELECT user_id, workplace_id, role, joined_at
        FROM workplace_memberships
        WHERE workplace_id = $1 AND role != 'REMOVED'
        ORDER BY joined_at
        "#,
    )
    .bind(workplace_id)
    .fetch_all(pool)
    .await?;

    Ok(memberships)
}

/// Add or reinstate a member, upserting over a prior `REMOVED` tombstone.
pub async fn upsert(
    pool: &PgPool,
    user_id: &str,
    workplace_id: Uuid,
    role: Role,
) -> Result<UserWorkplace, LedgerError> {
    let membership = sqlx::query_as::<_, UserWorkplace>(
        r#"
        INSERT INTO workplace_memberships (user_id, workplace_id, role, joined_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, workplace_id)
        DO UPDATE SET role = EXCLUDED.role
        RETURNING user_id, workplace_id, role, joined_at
        "#,
    )
    .bind(user_id)
    .bind(workplace_id)
    .bind(role)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(membership)
}

/// Tombstone a membership rather than deleting the row, preserving the audit trail.
pub async fn remove(pool: &PgPool, user_id: &str, workplace_id: Uuid) -> Result<(), LedgerError> {
    sqlx::query(
        r#"
        UPDATE workplace_memberships
        SET role = 'REMOVED'
        WHERE user_id = $1 AND workplace_id = $2
        "#,
    )
    .bind(user_id)
    .bind(workplace_id)
    .execute(pool)
    .await?;

    Ok(())
}
