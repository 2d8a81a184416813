//! Credit expiration at billing-period boundaries.
//!
//! When a billing period ends, every outstanding usage-credit grant whose
//! expiration instant is at or before the period's end date forfeits its
//! unconsumed remainder through a posted `GrantExpired` debit. The grant
//! itself is never mutated.

use chrono::Utc;
use serde_json::Map;

use ledgerline_shared::types::LedgerEntryId;

use super::account::LedgerAccount;
use super::balance::GrantBalance;
use super::command::BillingPeriodTransitionCommand;
use super::entry::{LedgerEntryDirection, LedgerEntryRecord, LedgerEntryStatus, LedgerEntryType};
use super::error::LedgerError;
use super::transaction::LedgerTransaction;

/// Input for the credit expiration calculation of one transition.
#[derive(Debug)]
pub struct ExpireCreditsInput<'a> {
    /// The subscription's ledger accounts (may be empty).
    pub ledger_accounts: &'a [LedgerAccount],
    /// The already-created container transaction the new entries reference.
    pub ledger_transaction: LedgerTransaction,
    /// The transition command supplying the cutoff and tenancy fields.
    pub command: &'a BillingPeriodTransitionCommand,
}

/// Result of the credit expiration calculation.
#[derive(Debug)]
pub struct ExpirationOutcome {
    /// The container transaction, returned unmodified.
    pub ledger_transaction: LedgerTransaction,
    /// Expiration entries in account-then-grant iteration order.
    pub ledger_entries: Vec<LedgerEntryRecord>,
}

/// Computes the `GrantExpired` entries for one billing-period transition.
///
/// `balance_source` is the balance-aggregation collaborator: given a ledger
/// account it returns the current available balance per outstanding
/// usage-credit grant on that account's meter. Its failures propagate
/// unchanged; no retry is attempted at this layer.
///
/// This is a pure single-pass computation: nothing is persisted here, and the
/// caller inserts the returned entries within the same database transaction
/// that commits the rest of the transition.
///
/// # Errors
///
/// Returns `LedgerError::UnsupportedTransitionPayload` if the command does
/// not carry a previous billing period, or whatever `balance_source` fails
/// with.
pub fn expire_credits_at_period_end<B>(
    input: ExpireCreditsInput<'_>,
    mut balance_source: B,
) -> Result<ExpirationOutcome, LedgerError>
where
    B: FnMut(&LedgerAccount) -> Result<Vec<GrantBalance>, LedgerError>,
{
    // No accounts means no balances to look up at all.
    if input.ledger_accounts.is_empty() {
        return Ok(ExpirationOutcome {
            ledger_transaction: input.ledger_transaction,
            ledger_entries: Vec::new(),
        });
    }

    let cutoff = input.command.expiration_cutoff()?;

    let mut account_balances = Vec::with_capacity(input.ledger_accounts.len());
    for account in input.ledger_accounts {
        let balances = balance_source(account)?;
        account_balances.push((account, balances));
    }

    if account_balances
        .iter()
        .all(|(_, balances)| balances.is_empty())
    {
        return Ok(ExpirationOutcome {
            ledger_transaction: input.ledger_transaction,
            ledger_entries: Vec::new(),
        });
    }

    let mut ledger_entries = Vec::new();
    for (account, balances) in account_balances {
        for balance in balances {
            let Some(expires_at) = balance.expires_at else {
                continue;
            };
            // Expiring exactly at the cutoff counts as expired.
            if expires_at > cutoff {
                continue;
            }
            if balance.available <= 0 {
                continue;
            }

            ledger_entries.push(LedgerEntryRecord {
                id: LedgerEntryId::new(),
                ledger_transaction_id: input.ledger_transaction.id,
                ledger_account_id: account.id,
                subscription_id: input.command.subscription_id,
                organization_id: input.command.organization_id,
                usage_meter_id: account.usage_meter_id,
                entry_type: LedgerEntryType::GrantExpired,
                direction: LedgerEntryDirection::Debit,
                amount: balance.available,
                status: LedgerEntryStatus::Posted,
                entry_timestamp: Utc::now(),
                metadata: Map::new(),
                source_usage_credit_id: Some(balance.usage_credit_id),
                livemode: input.command.livemode,
                description: format!(
                    "Expired usage credit grant {} at end of billing period",
                    balance.usage_credit_id
                ),
            });
        }
    }

    Ok(ExpirationOutcome {
        ledger_transaction: input.ledger_transaction,
        ledger_entries,
    })
}
