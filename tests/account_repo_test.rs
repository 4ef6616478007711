mod common;

use ledger_rs::domain::{AccountType, Role, TransactionType};
use ledger_rs::error::LedgerError;
use ledger_rs::services::account_service;
use ledger_rs::services::journal_service::post_journal;
use ledger_rs::services::membership_service::add_or_change_role;

#[tokio::test]
async fn currency_is_immutable_once_an_account_has_postings() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "account-currency").await;

    let cash = common::setup_account(&pool, &wp, "Cash", AccountType::Asset).await;
    let revenue = common::setup_account(&pool, &wp, "Revenue", AccountType::Revenue).await;

    let request = common::post_request(
        "Sale",
        vec![
            common::line(cash, "10.00", TransactionType::Debit),
            common::line(revenue, "10.00", TransactionType::Credit),
        ],
    );
    post_journal(&pool, &wp.member, wp.id, request).await.unwrap();

    let err = account_service::update_account(&pool, &wp.member, wp.id, cash, "Cash", "EUR", None)
        .await
        .expect_err("currency must not change once an account has postings");

    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn currency_may_change_before_the_first_posting() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "account-currency-unposted").await;

    let cash = common::setup_account(&pool, &wp, "Cash", AccountType::Asset).await;

    let updated = account_service::update_account(&pool, &wp.member, wp.id, cash, "Cash", "EUR", None)
        .await
        .expect("currency may change before any posting exists");

    assert_eq!(updated.currency_code, "EUR");
}

#[tokio::test]
async fn deactivated_account_is_still_readable() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "account-deactivate").await;

    let cash = common::setup_account(&pool, &wp, "Cash", AccountType::Asset).await;
    account_service::deactivate_account(&pool, &wp.member, wp.id, cash)
        .await
        .unwrap();

    let account = account_service::get_account(&pool, &wp.read_only, wp.id, cash)
        .await
        .expect("deactivated account must still be readable");

    assert!(!account.is_active);
}

#[tokio::test]
async fn read_only_member_cannot_deactivate_account() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "account-deactivate-forbidden").await;

    let cash = common::setup_account(&pool, &wp, "Cash", AccountType::Asset).await;

    let err = account_service::deactivate_account(&pool, &wp.read_only, wp.id, cash)
        .await
        .expect_err("read-only member must not be able to deactivate an account");

    assert!(matches!(err, LedgerError::Forbidden));
}

#[tokio::test]
async fn concurrent_post_and_currency_update_never_leave_a_posted_account_with_a_changed_currency() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "account-currency-race").await;

    let cash = common::setup_account(&pool, &wp, "Cash", AccountType::Asset).await;
    let revenue = common::setup_account(&pool, &wp, "Revenue", AccountType::Revenue).await;

    let request = common::post_request(
        "Racing sale",
        vec![
            common::line(cash, "10.00", TransactionType::Debit),
            common::line(revenue, "10.00", TransactionType::Credit),
        ],
    );

    // The posting pipeline row-locks `cash` via find_by_ids_for_update and
    // update_account row-locks it via find_by_id_for_update; whichever begins
    // first must finish (commit or roll back its validation) before the other
    // proceeds. Without that shared lock a post could commit between
    // update_account's has_postings check and its UPDATE.
    let (post_result, update_result) = tokio::join!(
        post_journal(&pool, &wp.member, wp.id, request),
        account_service::update_account(&pool, &wp.member, wp.id, cash, "Cash", "EUR", None),
    );
    post_result.expect("post should succeed regardless of ordering");

    let account = account_service::get_account(&pool, &wp.read_only, wp.id, cash)
        .await
        .unwrap();

    if update_result.is_ok() {
        assert_eq!(account.currency_code, "EUR");
    } else {
        assert_eq!(account.currency_code, "USD");
    }
}

#[tokio::test]
async fn only_admin_can_add_or_remove_members() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "membership-admin-only").await;

    let err = add_or_change_role(&pool, &wp.member, wp.id, "new-user", Role::Member)
        .await
        .expect_err("a MEMBER must not be able to enroll other members");
    assert!(matches!(err, LedgerError::Forbidden));

    add_or_change_role(&pool, &wp.admin, wp.id, "new-user", Role::Member)
        .await
        .expect("an ADMIN can enroll a new member");
}
