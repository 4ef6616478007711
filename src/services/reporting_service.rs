//! Reporting aggregator (§4.H): trial balance, profit and loss, balance sheet.
//! Thin layer over `report_repo`'s aggregate queries — all signing happens here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::domain::{AccountType, Role};
use crate::error::LedgerError;
use crate::repos::report_repo::{self, TrialBalanceRow};
use crate::services::balance_deltas::sign;

pub struct TrialBalanceLine {
    pub account_id: Uuid,
    pub account_name: String,
    pub account_type: AccountType,
    pub debit_total: Decimal,
    pub credit_total: Decimal,
    pub net: Decimal,
}

fn to_line(row: TrialBalanceRow) -> Result<TrialBalanceLine, LedgerError> {
    let net = sign(row.account_type, crate::domain::TransactionType::Debit)? * row.debit_total
        + sign(row.account_type, crate::domain::TransactionType::Credit)? * row.credit_total;

    Ok(TrialBalanceLine {
        account_id: row.account_id,
        account_name: row.account_name,
        account_type: row.account_type,
        debit_total: row.debit_total,
        credit_total: row.credit_total,
        net,
    })
}

pub async fn trial_balance(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    as_of: DateTime<Utc>,
) -> Result<Vec<TrialBalanceLine>, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::ReadOnly).await?;

    report_repo::trial_balance(pool, workplace_id, as_of)
        .await?
        .into_iter()
        .map(to_line)
        .collect()
}

pub struct ProfitAndLoss {
    pub revenue: Vec<TrialBalanceLine>,
    pub expenses: Vec<TrialBalanceLine>,
    pub net_profit: Decimal,
}

pub async fn profit_and_loss(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<ProfitAndLoss, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::ReadOnly).await?;

    let rows = report_repo::revenue_and_expense_activity(pool, workplace_id, from, to).await?;

    let mut revenue = Vec::new();
    let mut expenses = Vec::new();
    for row in rows {
        let line = to_line(row)?;
        match line.account_type {
            AccountType::Revenue => revenue.push(line),
            AccountType::Expense => expenses.push(line),
            other => {
                return Err(LedgerError::Internal(format!(
                    "unexpected account type {other:?} in profit-and-loss activity"
                )))
            }
        }
    }

    let revenue_total: Decimal = revenue.iter().map(|l| l.net).sum();
    let expense_total: Decimal = expenses.iter().map(|l| l.net).sum();

    Ok(ProfitAndLoss {
        revenue,
        expenses,
        net_profit: revenue_total - expense_total,
    })
}

pub struct BalanceSheet {
    pub assets: Vec<TrialBalanceLine>,
    pub liabilities: Vec<TrialBalanceLine>,
    pub equity: Vec<TrialBalanceLine>,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub total_equity: Decimal,
}

pub async fn balance_sheet(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    as_of: DateTime<Utc>,
) -> Result<BalanceSheet, LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::ReadOnly).await?;

    let rows = report_repo::balance_sheet_rows(pool, workplace_id, as_of).await?;

    let mut assets = Vec::new();
    let mut liabilities = Vec::new();
    let mut equity = Vec::new();
    for row in rows {
        let line = to_line(row)?;
        match line.account_type {
            AccountType::Asset => assets.push(line),
            AccountType::Liability => liabilities.push(line),
            AccountType::Equity => equity.push(line),
            other => {
                return Err(LedgerError::Internal(format!(
                    "unexpected account type {other:?} in balance sheet rows"
                )))
            }
        }
    }

    let total_assets: Decimal = assets.iter().map(|l| l.net).sum();
    let total_liabilities: Decimal = liabilities.iter().map(|l| l.net).sum();
    let total_equity: Decimal = equity.iter().map(|l| l.net).sum();

    Ok(BalanceSheet {
        assets,
        liabilities,
        equity,
        total_assets,
        total_liabilities,
        total_equity,
    })
}
