//! Reversal protocol (§4.F): posts a mirror journal with flipped transaction
//! types and links it back to the original, all in one storage transaction.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::domain::{Journal, JournalStatus, Role, Transaction as LedgerTransaction, TransactionInput};
use crate::error::LedgerError;
use crate::repos::{account_repo, journal_repo};
use crate::services::balance_deltas::{self, BalanceLine};

pub async fn reverse_journal(
    pool: &PgPool,
    actor_id: &str,
    workplace_id: Uuid,
    journal_id: Uuid,
) -> Result<(Journal, Vec<LedgerTransaction>), LedgerError> {
    auth::authorize(pool, actor_id, workplace_id, Role::Member).await?;

    let mut tx = pool.begin().await?;

    let original = journal_repo::find_journal_by_id_for_update(&mut tx, workplace_id, journal_id)
        .await?
        .ok_or_else(|| LedgerError::journal_not_found(journal_id))?;

    if original.status != JournalStatus::Posted {
        return Err(LedgerError::Conflict(format!(
            "journal {journal_id} is not POSTED"
        )));
    }

    if original.is_reversal() {
        return Err(LedgerError::Conflict(format!(
            "journal {journal_id} is itself a reversal and cannot be reversed"
        )));
    }

    let original_transactions =
        journal_repo::find_transactions_by_journal_id_tx(&mut tx, journal_id).await?;

    let mirrored_lines: Vec<TransactionInput> = original_transactions
        .iter()
        .map(|t| TransactionInput {
            account_id: t.account_id,
            amount: t.amount,
            transaction_type: t.transaction_type.flip(),
            notes: t.notes.clone(),
            transaction_date: Some(original.journal_date),
        })
        .collect();

    let account_ids: Vec<Uuid> = {
        let mut ids: Vec<Uuid> = mirrored_lines.iter().map(|t| t.account_id).collect();
        ids.sort();
        ids.dedup();
        ids
    };

    let accounts = account_repo::find_by_ids_for_update(&mut tx, workplace_id, &account_ids).await?;
    let account_types = accounts
        .iter()
        .map(|a| (a.id, a.account_type))
        .collect::<HashMap<_, _>>();

    // See the note in journal_service::post_journal: this grouped, per-account
    // total is computed to audit what the reversal is about to post.
    // `save_journal` still derives its own per-line delta for `running_balance`.
    let mirrored_balance_lines: Vec<BalanceLine> = mirrored_lines
        .iter()
        .map(|t| BalanceLine {
            account_id: t.account_id,
            amount: t.amount,
            transaction_type: t.transaction_type,
        })
        .collect();
    let deltas = balance_deltas::compute_deltas(&mirrored_balance_lines, &account_types)?;

    let description = format!("Reversal of Journal: {}", original.description);

    let (reversal, transactions) = journal_repo::save_journal(
        &mut tx,
        workplace_id,
        original.journal_date,
        &description,
        &original.currency_code,
        original.amount,
        Some(original.id),
        &mirrored_lines,
        &account_types,
    )
    .await?;

    journal_repo::update_journal_status_and_links(
        &mut tx,
        original.id,
        JournalStatus::Reversed,
        reversal.id,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        workplace_id = %workplace_id,
        original_journal_id = %original.id,
        reversal_journal_id = %reversal.id,
        accounts_affected = deltas.len(),
        "journal reversed"
    );

    Ok((reversal, transactions))
}
