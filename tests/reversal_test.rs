mod common;

use ledger_rs::domain::{AccountType, JournalStatus, TransactionType};
use ledger_rs::error::LedgerError;
use ledger_rs::repos::journal_repo;
use ledger_rs::services::journal_service::post_journal;
use ledger_rs::services::reversal_service::reverse_journal;
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::test]
async fn reversal_mirrors_lines_and_cancels_balances() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "reverse-basic").await;

    let cash = common::setup_account(&pool, &wp, "Cash", AccountType::Asset).await;
    let revenue = common::setup_account(&pool, &wp, "Revenue", AccountType::Revenue).await;

    let request = common::post_request(
        "Original sale",
        vec![
            common::line(cash, "75.00", TransactionType::Debit),
            common::line(revenue, "75.00", TransactionType::Credit),
        ],
    );
    let (original, _) = post_journal(&pool, &wp.member, wp.id, request).await.unwrap();

    let (reversal, reversal_lines) = reverse_journal(&pool, &wp.member, wp.id, original.id)
        .await
        .expect("reversal should succeed");

    assert_eq!(reversal.original_journal_id, Some(original.id));
    assert_eq!(reversal.amount, original.amount);
    assert_eq!(reversal_lines.len(), 2);

    let cash_line = reversal_lines.iter().find(|t| t.account_id == cash).unwrap();
    assert_eq!(cash_line.transaction_type, TransactionType::Credit);

    let original_after = ledger_rs::repos::journal_repo::find_journal_by_id(&pool, wp.id, original.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(original_after.status, JournalStatus::Reversed);
    assert_eq!(original_after.reversing_journal_id, Some(reversal.id));

    let cash_account = ledger_rs::repos::account_repo::find_by_id(&pool, wp.id, cash)
        .await
        .unwrap()
        .unwrap();
    let revenue_account = ledger_rs::repos::account_repo::find_by_id(&pool, wp.id, revenue)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cash_account.balance, Decimal::ZERO);
    assert_eq!(revenue_account.balance, Decimal::ZERO);
}

#[tokio::test]
async fn reversing_a_reversal_is_rejected() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "reverse-chain").await;

    let cash = common::setup_account(&pool, &wp, "Cash", AccountType::Asset).await;
    let revenue = common::setup_account(&pool, &wp, "Revenue", AccountType::Revenue).await;

    let request = common::post_request(
        "Original",
        vec![
            common::line(cash, "20.00", TransactionType::Debit),
            common::line(revenue, "20.00", TransactionType::Credit),
        ],
    );
    let (original, _) = post_journal(&pool, &wp.member, wp.id, request).await.unwrap();
    let (reversal, _) = reverse_journal(&pool, &wp.member, wp.id, original.id).await.unwrap();

    let err = reverse_journal(&pool, &wp.member, wp.id, reversal.id)
        .await
        .expect_err("a reversal must never itself be reversible");

    assert!(matches!(err, LedgerError::Conflict(_)));
}

#[tokio::test]
async fn reversing_an_already_reversed_journal_is_rejected() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "reverse-twice").await;

    let cash = common::setup_account(&pool, &wp, "Cash", AccountType::Asset).await;
    let revenue = common::setup_account(&pool, &wp, "Revenue", AccountType::Revenue).await;

    let request = common::post_request(
        "Original",
        vec![
            common::line(cash, "15.00", TransactionType::Debit),
            common::line(revenue, "15.00", TransactionType::Credit),
        ],
    );
    let (original, _) = post_journal(&pool, &wp.member, wp.id, request).await.unwrap();
    reverse_journal(&pool, &wp.member, wp.id, original.id).await.unwrap();

    let err = reverse_journal(&pool, &wp.member, wp.id, original.id)
        .await
        .expect_err("reversing an already-reversed journal must fail");

    assert!(matches!(err, LedgerError::Conflict(_)));
}

#[tokio::test]
async fn update_journal_status_and_links_rejects_a_missing_journal() {
    let pool = common::pool().await;

    let mut tx = pool.begin().await.unwrap();
    let err = journal_repo::update_journal_status_and_links(
        &mut tx,
        Uuid::new_v4(),
        JournalStatus::Reversed,
        Uuid::new_v4(),
    )
    .await
    .expect_err("updating a journal that doesn't exist must fail with NotFound");

    assert!(matches!(err, LedgerError::NotFound(_)));
}
