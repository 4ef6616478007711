//! Balance arithmetic: the signed-amount convention, the journal balance
//! validator, and deterministic per-account delta computation (§4.D).

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{AccountType, TransactionType};
use crate::error::LedgerError;

/// Signed multiplier for posting `tx_type` to an account of `account_type`.
/// `ASSET`/`EXPENSE` increase on DEBIT; `LIABILITY`/`EQUITY`/`REVENUE` increase on CREDIT.
pub fn sign(account_type: AccountType, tx_type: TransactionType) -> Result<Decimal, LedgerError> {
    use AccountType::*;
    use TransactionType::*;

    let positive_on_debit = matches!(account_type, Asset | Expense);
    let positive_on_credit = matches!(account_type, Liability | Equity | Revenue);

    match (positive_on_debit, positive_on_credit, tx_type) {
        (true, false, Debit) => Ok(Decimal::ONE),
        (true, false, Credit) => Ok(-Decimal::ONE),
        (false, true, Credit) => Ok(Decimal::ONE),
        (false, true, Debit) => Ok(-Decimal::ONE),
        _ => Err(LedgerError::Internal(format!(
            "unknown account type {account_type:?} in sign table"
        ))),
    }
}

/// One line as seen by the balance validator: an account reference, an
/// amount, and a debit/credit side, before ids or audit fields are assigned.
#[derive(Debug, Clone, Copy)]
pub struct BalanceLine {
    pub account_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
}

/// Journal balance validator (§4.D rules 1-4). Rejects with `Validation` on
/// any rule violation; callers run this before touching storage.
pub fn validate_balance(lines: &[BalanceLine]) -> Result<(), LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::Validation(
            "journal must contain at least two transactions".to_string(),
        ));
    }

    if lines.iter().any(|l| l.amount <= Decimal::ZERO) {
        return Err(LedgerError::Validation(
            "every transaction amount must be positive".to_string(),
        ));
    }

    let debit_sum: Decimal = lines
        .iter()
        .filter(|l| l.transaction_type == TransactionType::Debit)
        .map(|l| l.amount)
        .sum();
    let credit_sum: Decimal = lines
        .iter()
        .filter(|l| l.transaction_type == TransactionType::Credit)
        .map(|l| l.amount)
        .sum();

    if debit_sum != credit_sum {
        return Err(LedgerError::Validation(format!(
            "unbalanced journal: debit sum {debit_sum} does not equal credit sum {credit_sum}"
        )));
    }

    let distinct_accounts: std::collections::HashSet<Uuid> =
        lines.iter().map(|l| l.account_id).collect();
    if distinct_accounts.len() < 2 {
        return Err(LedgerError::Validation(
            "journal must touch at least two distinct accounts".to_string(),
        ));
    }

    Ok(())
}

/// Journal total amount: the sum of the debit-side lines (equals the credit
/// side once `validate_balance` has passed).
pub fn journal_amount(lines: &[BalanceLine]) -> Decimal {
    lines
        .iter()
        .filter(|l| l.transaction_type == TransactionType::Debit)
        .map(|l| l.amount)
        .sum()
}

/// Signed delta to apply to one account's materialized balance.
#[derive(Debug, Clone, Copy)]
pub struct BalanceDelta {
    pub account_id: Uuid,
    pub delta: Decimal,
}

/// Compute the signed balance delta per account, grouping multiple lines on
/// the same account, sorted by `account_id` for deterministic lock ordering.
pub fn compute_deltas(
    lines: &[BalanceLine],
    account_types: &HashMap<Uuid, AccountType>,
) -> Result<Vec<BalanceDelta>, LedgerError> {
    let mut totals: HashMap<Uuid, Decimal> = HashMap::new();

    for line in lines {
        let account_type = *account_types.get(&line.account_id).ok_or_else(|| {
            LedgerError::Internal(format!(
                "no account_type supplied for account {}",
                line.account_id
            ))
        })?;
        let signed = sign(account_type, line.transaction_type)? * line.amount;
        *totals.entry(line.account_id).or_insert(Decimal::ZERO) += signed;
    }

    let mut deltas: Vec<BalanceDelta> = totals
        .into_iter()
        .map(|(account_id, delta)| BalanceDelta { account_id, delta })
        .collect();
    deltas.sort_by_key(|d| d.account_id);

    Ok(deltas)
}
