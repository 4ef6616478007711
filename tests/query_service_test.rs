mod common;

use ledger_rs::domain::{AccountType, TransactionType};
use ledger_rs::services::journal_service::post_journal;
use ledger_rs::services::query_service::{calculate_balance, list_journals, ListJournalsRequest};
use rust_decimal::Decimal;
use std::collections::HashSet;

#[tokio::test]
async fn calculate_balance_agrees_with_audited_sum() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "query-balance").await;

    let cash = common::setup_account(&pool, &wp, "Cash", AccountType::Asset).await;
    let revenue = common::setup_account(&pool, &wp, "Revenue", AccountType::Revenue).await;

    for amount in ["10.00", "25.50", "5.00"] {
        let request = common::post_request(
            "Sale",
            vec![
                common::line(cash, amount, TransactionType::Debit),
                common::line(revenue, amount, TransactionType::Credit),
            ],
        );
        post_journal(&pool, &wp.member, wp.id, request).await.unwrap();
    }

    let balance = calculate_balance(&pool, &wp.read_only, wp.id, cash).await.unwrap();
    assert_eq!(balance, Decimal::new(4050, 2));
}

#[tokio::test]
async fn list_journals_paginates_without_gaps_or_duplicates() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "query-pagination").await;

    let cash = common::setup_account(&pool, &wp, "Cash", AccountType::Asset).await;
    let revenue = common::setup_account(&pool, &wp, "Revenue", AccountType::Revenue).await;

    let mut posted_ids = HashSet::new();
    for i in 0..25 {
        let request = common::post_request(
            &format!("Entry {i}"),
            vec![
                common::line(cash, "1.00", TransactionType::Debit),
                common::line(revenue, "1.00", TransactionType::Credit),
            ],
        );
        let (journal, _) = post_journal(&pool, &wp.member, wp.id, request).await.unwrap();
        posted_ids.insert(journal.id);
    }

    let mut seen = HashSet::new();
    let mut next_token: Option<String> = None;
    loop {
        let page = list_journals(
            &pool,
            &wp.read_only,
            wp.id,
            ListJournalsRequest {
                limit: Some(10),
                next_token: next_token.clone(),
                include_reversals: true,
                include_transactions: false,
            },
        )
        .await
        .unwrap();

        for journal in &page.journals {
            assert!(seen.insert(journal.id), "journal {} seen twice", journal.id);
        }

        if page.journals.len() < 10 {
            break;
        }

        let last = page.journals.last().unwrap();
        next_token = Some(
            ledger_rs::pagination::JournalCursor {
                journal_date: last.journal_date,
                created_at: last.created_at,
                id: last.id,
            }
            .encode(),
        );
    }

    assert_eq!(seen, posted_ids);
}
