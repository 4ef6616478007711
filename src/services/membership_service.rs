//! Membership management (§4.B): adding, removing, and re-roling members is
//! `ADMIN`-only; viewing the roster only needs `READ_ONLY`.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::domain::{Role, UserWorkplace};
use crate::error::LedgerError;
use crate::repos::membership_repo;

/// Add a member or change an existing member's role — `upsert` handles both,
/// including reinstating a previously-removed (tombstoned) membership.
pub async fn add_or_change_role(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    target_user_id: &str,
    role: Role,
) -> Result<UserWorkplace, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::Admin).await?;

    let membership = membership_repo::upsert(pool, target_user_id, workplace_id, role).await?;

    tracing::info!(
        workplace_id = %workplace_id,
        target_user_id = %target_user_id,
        role = ?role,
        "membership upserted"
    );

    Ok(membership)
}

pub async fn remove_member(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    target_user_id: &str,
) -> Result<(), LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::Admin).await?;

    membership_repo::remove(pool, target_user_id, workplace_id).await?;

    tracing::info!(
        workplace_id = %workplace_id,
        target_user_id = %target_user_id,
        "membership removed"
    );

    Ok(())
}

pub async fn list_members(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
) -> Result<Vec<UserWorkplace>, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::ReadOnly).await?;

    membership_repo::list_by_workplace(pool, workplace_id).await
}
