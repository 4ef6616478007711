//! Workplace lifecycle (§4.B). `CreateWorkplace` needs no membership check —
//! any authenticated principal may create one and is enrolled as its first
//! `ADMIN` by `workplace_repo::create`. Every other operation is gated.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::domain::{Role, Workplace};
use crate::error::LedgerError;
use crate::repos::workplace_repo;

pub async fn create_workplace(
    pool: &PgPool,
    actor_id: &str,
    name: &str,
    description: Option<&str>,
    default_currency_code: Option<&str>,
) -> Result<Workplace, LedgerError> {
    let workplace =
        workplace_repo::create(pool, actor_id, name, description, default_currency_code).await?;

    tracing::info!(workplace_id = %workplace.id, "workplace created");

    Ok(workplace)
}

pub async fn get_workplace(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
) -> Result<Workplace, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::ReadOnly).await?;

    workplace_repo::find_by_id(pool, workplace_id)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("workplace {workplace_id} not found")))
}

/// Inherently self-scoped: the query only ever returns workplaces `actor_id`
/// already belongs to, so there is no separate workplace to authorize against.
pub async fn list_workplaces_for_user(
    pool: &PgPool,
    actor_id: &str,
) -> Result<Vec<Workplace>, LedgerError> {
    workplace_repo::list_for_user(pool, actor_id).await
}

pub async fn deactivate_workplace(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
) -> Result<Workplace, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::Admin).await?;

    let workplace = workplace_repo::deactivate(pool, workplace_id).await?;

    tracing::info!(workplace_id = %workplace.id, "workplace deactivated");

    Ok(workplace)
}
