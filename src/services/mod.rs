pub mod account_service;
pub mod balance_deltas;
pub mod journal_service;
pub mod membership_service;
pub mod query_service;
pub mod reporting_service;
pub mod reversal_service;
pub mod workplace_service;
