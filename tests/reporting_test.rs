mod common;

use ledger_rs::domain::{AccountType, TransactionType};
use ledger_rs::services::account_service;
use ledger_rs::services::journal_service::post_journal;
use ledger_rs::services::reporting_service::{balance_sheet, trial_balance};
use rust_decimal::Decimal;

#[tokio::test]
async fn balance_sheet_satisfies_the_accounting_identity() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "report-balance-sheet").await;

    let cash = common::setup_account(&pool, &wp, "Cash", AccountType::Asset).await;
    let loan = common::setup_account(&pool, &wp, "Loan Payable", AccountType::Liability).await;
    let equity = common::setup_account(&pool, &wp, "Owner Equity", AccountType::Equity).await;

    // Owner contributes capital, then the business borrows.
    let contribution = common::post_request(
        "Owner contribution",
        vec![
            common::line(cash, "1000.00", TransactionType::Debit),
            common::line(equity, "1000.00", TransactionType::Credit),
        ],
    );
    post_journal(&pool, &wp.member, wp.id, contribution).await.unwrap();

    let loan_proceeds = common::post_request(
        "Loan drawdown",
        vec![
            common::line(cash, "500.00", TransactionType::Debit),
            common::line(loan, "500.00", TransactionType::Credit),
        ],
    );
    post_journal(&pool, &wp.member, wp.id, loan_proceeds).await.unwrap();

    let sheet = balance_sheet(&pool, &wp.read_only, wp.id, common::days_ago(0))
        .await
        .unwrap();

    assert_eq!(sheet.total_assets, Decimal::new(150000, 2));
    assert_eq!(sheet.total_liabilities, Decimal::new(50000, 2));
    assert_eq!(sheet.total_equity, Decimal::new(100000, 2));
    assert_eq!(sheet.total_assets, sheet.total_liabilities + sheet.total_equity);
}

#[tokio::test]
async fn profit_and_loss_nets_revenue_against_expenses() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "report-pnl").await;

    let cash = common::setup_account(&pool, &wp, "Cash", AccountType::Asset).await;
    let revenue = common::setup_account(&pool, &wp, "Revenue", AccountType::Revenue).await;
    let expense = common::setup_account(&pool, &wp, "Rent Expense", AccountType::Expense).await;

    let sale = common::post_request(
        "Sale",
        vec![
            common::line(cash, "300.00", TransactionType::Debit),
            common::line(revenue, "300.00", TransactionType::Credit),
        ],
    );
    post_journal(&pool, &wp.member, wp.id, sale).await.unwrap();

    let rent = common::post_request(
        "Rent",
        vec![
            common::line(expense, "120.00", TransactionType::Debit),
            common::line(cash, "120.00", TransactionType::Credit),
        ],
    );
    post_journal(&pool, &wp.member, wp.id, rent).await.unwrap();

    let from = common::days_ago(1);
    let to = common::days_ago(0) + chrono::Duration::days(1);

    let pnl = ledger_rs::services::reporting_service::profit_and_loss(
        &pool,
        &wp.read_only,
        wp.id,
        from,
        to,
    )
    .await
    .unwrap();

    assert_eq!(pnl.net_profit, Decimal::new(18000, 2));
}

#[tokio::test]
async fn trial_balance_excludes_deactivated_accounts() {
    let pool = common::pool().await;
    let wp = common::setup_workplace(&pool, "report-trial-balance").await;

    let cash = common::setup_account(&pool, &wp, "Cash", AccountType::Asset).await;
    let revenue = common::setup_account(&pool, &wp, "Revenue", AccountType::Revenue).await;

    let sale = common::post_request(
        "Sale",
        vec![
            common::line(cash, "200.00", TransactionType::Debit),
            common::line(revenue, "200.00", TransactionType::Credit),
        ],
    );
    post_journal(&pool, &wp.member, wp.id, sale).await.unwrap();

    account_service::deactivate_account(&pool, &wp.member, wp.id, revenue)
        .await
        .unwrap();

    let rows = trial_balance(&pool, &wp.read_only, wp.id, common::days_ago(0))
        .await
        .unwrap();

    assert!(rows.iter().any(|r| r.account_id == cash));
    assert!(
        !rows.iter().any(|r| r.account_id == revenue),
        "deactivated accounts with historical postings must not appear in the trial balance"
    );
}
