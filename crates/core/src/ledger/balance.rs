//! Available-balance aggregation for usage-credit grants.
//!
//! A grant's available balance is its issued amount minus all posted
//! consuming debits recorded against it. `CreditAppliedToUsage` entries are
//! informational bookkeeping and never reduce the computable balance, and
//! pending entries are excluded until posted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerline_shared::types::UsageCreditId;

use super::credit::UsageCreditGrant;
use super::entry::LedgerEntryRecord;

/// The current available balance of one outstanding usage-credit grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantBalance {
    /// The grant this balance belongs to.
    pub usage_credit_id: UsageCreditId,
    /// The grant's expiration instant, if any.
    pub expires_at: Option<DateTime<Utc>>,
    /// Issued amount minus posted consuming debits.
    ///
    /// Negative values indicate an upstream data-integrity problem and are
    /// passed through as-is rather than clamped here.
    pub available: i64,
}

/// Aggregates per-grant available balances for one ledger account.
///
/// `grants` are the account's usage-credit grants; `entries` are the ledger
/// entries posted against that account. Output order follows `grants`.
#[must_use]
pub fn available_balances(
    grants: &[UsageCreditGrant],
    entries: &[LedgerEntryRecord],
) -> Vec<GrantBalance> {
    grants
        .iter()
        .map(|grant| {
            let consumed: i64 = entries
                .iter()
                .filter(|entry| entry.consumes_grant(grant.id))
                .map(|entry| entry.amount)
                .sum();

            GrantBalance {
                usage_credit_id: grant.id,
                expires_at: grant.expires_at,
                available: grant.issued_amount - consumed,
            }
        })
        .collect()
}
