//! Authorization gate: resolves (user, workplace) to a role and enforces a
//! role floor ahead of every ledger operation. Centralized here rather than
//! inlined per-service call site, so every write path audits to exactly one
//! `authorize` call.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::Role;
use crate::error::LedgerError;
use crate::repos::membership_repo;

/// Looks up `(user_id, workplace_id)` and enforces `required`.
///
/// A missing or tombstoned (`REMOVED`) membership returns `NotFound` rather
/// than `Forbidden` — membership existence is itself confidential, so a
/// non-member probing a workplace cannot distinguish "you're not a member"
/// from "this workplace doesn't exist".
pub async fn authorize(
    pool: &PgPool,
    user_id: &str,
    workplace_id: Uuid,
    required: Role,
) -> Result<(), LedgerError> {
    let membership = membership_repo::find(pool, user_id, workplace_id).await?;

    let role = match membership {
        Some(m) if m.role != Role::Removed => m.role,
        _ => {
            return Err(LedgerError::NotFound(format!(
                "workplace {workplace_id} not found"
            )))
        }
    };

    if role.satisfies(required) {
        Ok(())
    } else {
        Err(LedgerError::Forbidden)
    }
}
