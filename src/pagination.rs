//! Opaque cursor pagination over time-ordered rows.
//!
//! A token encodes one or more `|`-joined fields, base64-encoded (URL-safe, no
//! padding). Callers never parse tokens; only the two repository list
//! functions that emit them know the field layout they expect back.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::LedgerError;

/// Cursor for `list_journals_by_workplace`: `(journal_date, created_at, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalCursor {
    pub journal_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub id: uuid::Uuid,
}

impl JournalCursor {
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}|{}|{}",
            self.journal_date.to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.id
        );
        URL_SAFE_NO_PAD.encode(raw)
    }

    pub fn decode(token: &str) -> Result<Self, LedgerError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| LedgerError::BadRequest("invalid pagination token".to_string()))?;
        let raw = String::from_utf8(raw)
            .map_err(|_| LedgerError::BadRequest("invalid pagination token".to_string()))?;
        let mut parts = raw.splitn(3, '|');
        let bad_token = || LedgerError::BadRequest("invalid pagination token".to_string());

        let journal_date = parts
            .next()
            .ok_or_else(bad_token)?
            .parse::<DateTime<Utc>>()
            .map_err(|_| bad_token())?;
        let created_at = parts
            .next()
            .ok_or_else(bad_token)?
            .parse::<DateTime<Utc>>()
            .map_err(|_| bad_token())?;
        let id = parts
            .next()
            .ok_or_else(bad_token)?
            .parse::<uuid::Uuid>()
            .map_err(|_| bad_token())?;

        Ok(JournalCursor {
            journal_date,
            created_at,
            id,
        })
    }
}

/// Cursor for `list_transactions_by_account`: `(account_id, transaction_date, created_at, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionCursor {
    pub account_id: uuid::Uuid,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub id: uuid::Uuid,
}

impl TransactionCursor {
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}|{}|{}|{}",
            self.account_id,
            self.transaction_date.to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.id
        );
        URL_SAFE_NO_PAD.encode(raw)
    }

    pub fn decode(token: &str) -> Result<Self, LedgerError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| LedgerError::BadRequest("invalid pagination token".to_string()))?;
        let raw = String::from_utf8(raw)
            .map_err(|_| LedgerError::BadRequest("invalid pagination token".to_string()))?;
        let mut parts = raw.splitn(4, '|');
        let bad_token = || LedgerError::BadRequest("invalid pagination token".to_string());

        let account_id = parts
            .next()
            .ok_or_else(bad_token)?
            .parse::<uuid::Uuid>()
            .map_err(|_| bad_token())?;
        let transaction_date = parts
            .next()
            .ok_or_else(bad_token)?
            .parse::<DateTime<Utc>>()
            .map_err(|_| bad_token())?;
        let created_at = parts
            .next()
            .ok_or_else(bad_token)?
            .parse::<DateTime<Utc>>()
            .map_err(|_| bad_token())?;
        let id = parts
            .next()
            .ok_or_else(bad_token)?
            .parse::<uuid::Uuid>()
            .map_err(|_| bad_token())?;

        Ok(TransactionCursor {
            account_id,
            transaction_date,
            created_at,
            id,
        })
    }
}

/// Default and maximum page size shared by every paginated query (§4.G).
pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Clamp a caller-supplied limit to `(0, MAX_PAGE_LIMIT]`, defaulting unset or
/// non-positive values to `DEFAULT_PAGE_LIMIT`.
pub fn normalize_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(l) if l > 0 => l.min(MAX_PAGE_LIMIT),
        _ => DEFAULT_PAGE_LIMIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn journal_cursor_round_trips() {
        let cursor = JournalCursor {
            journal_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap(),
            id: Uuid::new_v4(),
        };
        let token = cursor.encode();
        let decoded = JournalCursor::decode(&token).unwrap();
        assert_eq!(cursor, decoded);
    }

    #[test]
    fn transaction_cursor_round_trips() {
        let cursor = TransactionCursor {
            account_id: Uuid::new_v4(),
            transaction_date: Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 1).unwrap(),
            id: Uuid::new_v4(),
        };
        let token = cursor.encode();
        let decoded = TransactionCursor::decode(&token).unwrap();
        assert_eq!(cursor, decoded);
    }

    #[test]
    fn invalid_token_is_bad_request() {
        let err = JournalCursor::decode("not-valid-base64!!").unwrap_err();
        assert!(matches!(err, LedgerError::BadRequest(_)));
    }

    #[test]
    fn normalize_limit_defaults_and_clamps() {
        assert_eq!(normalize_limit(None), DEFAULT_PAGE_LIMIT);
        assert_eq!(normalize_limit(Some(0)), DEFAULT_PAGE_LIMIT);
        assert_eq!(normalize_limit(Some(-5)), DEFAULT_PAGE_LIMIT);
        assert_eq!(normalize_limit(Some(500)), MAX_PAGE_LIMIT);
        assert_eq!(normalize_limit(Some(10)), 10);
    }
}
