//! Core ledger entities shared by every repository and service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference currency. Immutable once created for the ledger's purposes.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
    pub name: String,
    pub precision: i16,
}

/// Tenant boundary. All ledger objects are scoped to exactly one workplace.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Workplace {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub default_currency_code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's role within a workplace. Authorization source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "workplace_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Member,
    ReadOnly,
    Removed,
}

impl Role {
    /// Whether this role satisfies a required floor, per the `ADMIN ⊇ MEMBER ⊇ READ_ONLY`
    /// hierarchy. `Removed` satisfies nothing — a tombstoned membership is treated as absent.
    pub fn satisfies(self, required: Role) -> bool {
        match (self, required) {
            (Role::Removed, _) => false,
            (_, Role::Removed) => false,
            (Role::Admin, _) => true,
            (Role::Member, Role::Member | Role::ReadOnly) => true,
            (Role::ReadOnly, Role::ReadOnly) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserWorkplace {
    pub user_id: String,
    pub workplace_id: Uuid,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "account_type", rename_all = "UPPERCASE")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub workplace_id: Uuid,
    pub name: String,
    pub account_type: AccountType,
    pub currency_code: String,
    pub parent_account_id: Option<Uuid>,
    pub description: Option<String>,
    pub is_active: bool,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn allows_posting(&self) -> bool {
        self.is_active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "journal_status", rename_all = "UPPERCASE")]
pub enum JournalStatus {
    Posted,
    Reversed,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Journal {
    pub id: Uuid,
    pub workplace_id: Uuid,
    pub journal_date: DateTime<Utc>,
    pub description: String,
    pub currency_code: String,
    pub amount: Decimal,
    pub status: JournalStatus,
    pub original_journal_id: Option<Uuid>,
    pub reversing_journal_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Journal {
    /// A journal with `original_journal_id` set is itself a reversal and must never be reversed.
    pub fn is_reversal(&self) -> bool {
        self.original_journal_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "transaction_type", rename_all = "UPPERCASE")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl TransactionType {
    pub fn flip(self) -> Self {
        match self {
            TransactionType::Debit => TransactionType::Credit,
            TransactionType::Credit => TransactionType::Debit,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub journal_id: Uuid,
    pub account_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub currency_code: String,
    pub notes: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub running_balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A single debit or credit line as supplied by a caller posting a new journal,
/// before ids, running balances, or audit fields have been assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionInput {
    pub account_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub notes: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
}
