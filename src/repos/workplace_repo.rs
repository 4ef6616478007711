//! Repository for workplaces — the multi-tenant boundary.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Role, Workplace};
use crate::error::LedgerError;

pub async fn find_by_id(pool: &PgPool, workplace_id: Uuid) -> Result<Option<Workplace>, LedgerError> {
    let workplace = sqlx::query_as::<_, Workplace>(
        r#"
        SELECT id, name, description, default_currency_code, is_active, created_at, updated_at
        FROM workplaces
        WHERE id = $1
        "#,
    )
    .bind(workplace_id)
    .fetch_optional(pool)
    .await?;

    Ok(workplace)
}

/// List workplaces the given user belongs to, skipping tombstoned memberships.
pub async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Workplace>, LedgerError> {
    let workplaces = sqlx::query_as::<_, Workplace>(
        r#"
        SELECT w.id, w.name, w.description, w.default_currency_code, w.is_active,
               w.created_at, w.updated_at
        FROM workplaces w
        JOIN workplace_memberships m ON m.workplace_id = w.id
        WHERE m.user_id = $1 AND m.role != 'REMOVED'
        ORDER BY w.name
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(workplaces)
}

/// Create a workplace and enroll its creator as `ADMIN` in one transaction.
pub async fn create(
    pool: &PgPool,
    creator_user_id: &str,
    name: &str,
    description: Option<&str>,
    default_currency_code: Option<&str>,
) -> Result<Workplace, LedgerError> {
    let mut tx = pool.begin().await?;
    let id = Uuid::new_v4();
    let now = Utc::now();

    let workplace = sqlx::query_as::<_, Workplace>(
        r#"
        INSERT INTO workplaces (id, name, description, default_currency_code, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, true, $5, $5)
        RETURNING id, name, description, default_currency_code, is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(default_currency_code)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO workplace_memberships (user_id, workplace_id, role, joined_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(creator_user_id)
    .bind(id)
    .bind(Role::Admin)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(workplace)
}

pub async fn deactivate(pool: &PgPool, workplace_id: Uuid) -> Result<Workplace, LedgerError> {
    let workplace = sqlx::query_as::<_, Workplace>(
        r#"
        UPDATE workplaces
        SET is_active = false, updated_at = $2
        WHERE id = $1
        RETURNING id, name, description, default_currency_code, is_active, created_at, updated_at
        "#,
    )
    .bind(workplace_id)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| LedgerError::NotFound(format!("workplace {workplace_id} not found")))?;

    Ok(workplace)
}
