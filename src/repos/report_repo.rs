//! Aggregate queries backing the reporting layer (§4.H). No business rules
//! live here — signing and totals are computed by the caller from raw rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::AccountType;
use crate::error::LedgerError;

/// One row of the trial balance: every account in the workplace with its
/// lifetime debit and credit totals, independent of sign convention.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrialBalanceRow {
    pub account_id: Uuid,
    pub account_name: String,
    pub account_type: AccountType,
    pub debit_total: Decimal,
    pub credit_total: Decimal,
}

pub async fn trial_balance(
    pool: &PgPool,
    workplace_id: Uuid,
    as_of: DateTime<Utc>,
) -> Result<Vec<TrialBalanceRow>, LedgerError> {
    let rows = sqlx::query_as::<_, TrialBalanceRow>(
        r#"
        SELECT
            a.id AS account_id,
            a.name AS account_name,
            a.account_type AS account_type,
            COALESCE(SUM(t.amount) FILTER (WHERE t.transaction_type = 'DEBIT'), 0) AS debit_total,
            COALESCE(SUM(t.amount) FILTER (WHERE t.transaction_type = 'CREDIT'), 0) AS credit_total
        FROM accounts a
        LEFT JOIN transactions t
            ON t.account_id = a.id AND t.transaction_date <= $2
        WHERE a.workplace_id = $1
          AND a.is_active
        GROUP BY a.id, a.name, a.account_type
        ORDER BY a.name
        "#,
    )
    .bind(workplace_id)
    .bind(as_of)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Lifetime debit/credit totals for every REVENUE/EXPENSE account posted
/// within `[from, to]`, for the profit-and-loss statement.
pub async fn revenue_and_expense_activity(
    pool: &PgPool,
    workplace_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<TrialBalanceRow>, LedgerError> {
    let rows = sqlx::query_as::<_, TrialBalanceRow>(
        r#"
        SELECT
            a.id AS account_id,
            a.name AS account_name,
            a.account_type AS account_type,
            COALESCE(SUM(t.amount) FILTER (WHERE t.transaction_type = 'DEBIT'), 0) AS debit_total,
            COALESCE(SUM(t.amount) FILTER (WHERE t.transaction_type = 'CREDIT'), 0) AS credit_total
        FROM accounts a
        JOIN transactions t ON t.account_id = a.id
        WHERE a.workplace_id = $1
          AND a.account_type IN ('REVENUE', 'EXPENSE')
          AND t.transaction_date BETWEEN $2 AND $3
        GROUP BY a.id, a.name, a.account_type
        ORDER BY a.name
        "#,
    )
    .bind(workplace_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Balances as of a point in time for the three balance-sheet categories.
pub async fn balance_sheet_rows(
    pool: &PgPool,
    workplace_id: Uuid,
    as_of: DateTime<Utc>,
) -> Result<Vec<TrialBalanceRow>, LedgerError> {
    let rows = sqlx::query_as::<_, TrialBalanceRow>(
        r#"
        SELECT
            a.id AS account_id,
            a.name AS account_name,
            a.account_type AS account_type,
            COALESCE(SUM(t.amount) FILTER (WHERE t.transaction_type = 'DEBIT'), 0) AS debit_total,
            COALESCE(SUM(t.amount) FILTER (WHERE t.transaction_type = 'CREDIT'), 0) AS credit_total
        FROM accounts a
        LEFT JOIN transactions t
            ON t.account_id = a.id AND t.transaction_date <= $2
        WHERE a.workplace_id = $1
          AND a.account_type IN ('ASSET', 'LIABILITY', 'EQUITY')
        GROUP BY a.id, a.name, a.account_type
        ORDER BY a.name
        "#,
    )
    .bind(workplace_id)
    .bind(as_of)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
