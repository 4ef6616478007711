mod common;

use ledger_rs::domain::Role;
use ledger_rs::error::LedgerError;
use ledger_rs::repos::membership_repo;
use ledger_rs::services::workplace_service;

#[tokio::test]
async fn authorize_rejects_tombstoned_membership_as_not_found() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "auth-tombstone").await;

    membership_repo::remove(&pool, &wp.member, wp.id).await.unwrap();

    let err = ledger_rs::auth::authorize(&pool, &wp.member, wp.id, Role::ReadOnly)
        .await
        .expect_err("a removed member must be treated as absent");

    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[tokio::test]
async fn reinstating_a_removed_member_restores_access() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "auth-reinstate").await;

    membership_repo::remove(&pool, &wp.member, wp.id).await.unwrap();
    membership_repo::upsert(&pool, &wp.member, wp.id, Role::Member)
        .await
        .unwrap();

    ledger_rs::auth::authorize(&pool, &wp.member, wp.id, Role::Member)
        .await
        .expect("reinstated member should satisfy MEMBER");
}

#[tokio::test]
async fn admin_satisfies_every_role_floor() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "auth-admin").await;

    ledger_rs::auth::authorize(&pool, &wp.admin, wp.id, Role::Admin)
        .await
        .unwrap();
    ledger_rs::auth::authorize(&pool, &wp.admin, wp.id, Role::Member)
        .await
        .unwrap();
    ledger_rs::auth::authorize(&pool, &wp.admin, wp.id, Role::ReadOnly)
        .await
        .unwrap();
}

#[tokio::test]
async fn only_admin_can_deactivate_a_workplace() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "auth-deactivate-workplace").await;

    let err = workplace_service::deactivate_workplace(&pool, &wp.member, wp.id)
        .await
        .expect_err("a MEMBER must not be able to deactivate the workplace");
    assert!(matches!(err, LedgerError::Forbidden));

    let workplace = workplace_service::deactivate_workplace(&pool, &wp.admin, wp.id)
        .await
        .expect("an ADMIN can deactivate the workplace");
    assert!(!workplace.is_active);
}
