//! Ledger entry domain types.
//!
//! Entries are immutable, append-only records of single balance movements.
//! Corrections are new entries, never edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use ledgerline_shared::types::{
    LedgerAccountId, LedgerEntryId, LedgerTransactionId, OrganizationId, SubscriptionId,
    UsageCreditId, UsageMeterId,
};

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryDirection {
    /// Credit entry (increases the available balance).
    Credit,
    /// Debit entry (decreases the available balance).
    Debit,
}

/// Classification of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    /// Credit recognizing a newly issued usage-credit grant.
    GrantRecognized,
    /// Debit recording metered usage cost against the account.
    UsageDebit,
    /// Debit consuming part of a grant's balance to cover usage.
    CreditApplied,
    /// Informational credit mirroring the portion of usage cost covered by a
    /// grant. Never reduces the grant's computable remaining balance.
    CreditAppliedToUsage,
    /// Debit forfeiting a grant's unconsumed remainder at period end.
    GrantExpired,
}

impl LedgerEntryType {
    /// Returns true if a posted debit of this type consumes a grant's balance.
    ///
    /// `CreditAppliedToUsage` is bookkeeping only and is always excluded from
    /// balance aggregation.
    #[must_use]
    pub fn consumes_grant_balance(&self) -> bool {
        matches!(self, Self::CreditApplied | Self::GrantExpired)
    }
}

/// Posting status of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryStatus {
    /// Entry is provisional and excluded from balance aggregation.
    Pending,
    /// Entry is final. Amount and direction are never mutated after this.
    Posted,
}

impl LedgerEntryStatus {
    /// Returns true if the entry is immutable.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        matches!(self, Self::Posted)
    }
}

/// An immutable record of a single balance movement.
///
/// Created exclusively by ledger-command handlers inside a single atomic
/// transaction; persisted by the caller through the standard insert path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntryRecord {
    /// Unique identifier for this entry.
    pub id: LedgerEntryId,
    /// The atomic transaction group this entry was written with.
    pub ledger_transaction_id: LedgerTransactionId,
    /// The (subscription, usage meter) account this entry posts to.
    pub ledger_account_id: LedgerAccountId,
    /// The subscription this entry belongs to.
    pub subscription_id: SubscriptionId,
    /// The merchant organization this entry belongs to.
    pub organization_id: OrganizationId,
    /// The usage meter this entry is scoped to.
    pub usage_meter_id: UsageMeterId,
    /// Entry classification.
    pub entry_type: LedgerEntryType,
    /// Credit or debit.
    pub direction: LedgerEntryDirection,
    /// Non-negative amount in the smallest unit of the meter's measure.
    pub amount: i64,
    /// Posting status.
    pub status: LedgerEntryStatus,
    /// When the movement took effect.
    pub entry_timestamp: DateTime<Utc>,
    /// Free-form metadata.
    pub metadata: Map<String, Value>,
    /// The usage-credit grant this entry moves balance for, if any.
    pub source_usage_credit_id: Option<UsageCreditId>,
    /// Whether this entry belongs to live (vs. test) mode.
    pub livemode: bool,
    /// Human-readable description.
    pub description: String,
}

impl LedgerEntryRecord {
    /// Returns the signed amount (positive for credit, negative for debit).
    #[must_use]
    pub fn signed_amount(&self) -> i64 {
        match self.direction {
            LedgerEntryDirection::Credit => self.amount,
            LedgerEntryDirection::Debit => -self.amount,
        }
    }

    /// Returns true if this posted entry consumes balance from the given grant.
    #[must_use]
    pub fn consumes_grant(&self, usage_credit_id: UsageCreditId) -> bool {
        self.status == LedgerEntryStatus::Posted
            && self.direction == LedgerEntryDirection::Debit
            && self.entry_type.consumes_grant_balance()
            && self.source_usage_credit_id == Some(usage_credit_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(
        entry_type: LedgerEntryType,
        direction: LedgerEntryDirection,
        amount: i64,
        grant: Option<UsageCreditId>,
    ) -> LedgerEntryRecord {
        LedgerEntryRecord {
            id: LedgerEntryId::new(),
            ledger_transaction_id: LedgerTransactionId::new(),
            ledger_account_id: LedgerAccountId::new(),
            subscription_id: SubscriptionId::new(),
            organization_id: OrganizationId::new(),
            usage_meter_id: UsageMeterId::new(),
            entry_type,
            direction,
            amount,
            status: LedgerEntryStatus::Posted,
            entry_timestamp: Utc::now(),
            metadata: Map::new(),
            source_usage_credit_id: grant,
            livemode: true,
            description: "test entry".to_string(),
        }
    }

    #[test]
    fn test_signed_amount() {
        let credit = make_entry(
            LedgerEntryType::GrantRecognized,
            LedgerEntryDirection::Credit,
            100,
            None,
        );
        let debit = make_entry(
            LedgerEntryType::UsageDebit,
            LedgerEntryDirection::Debit,
            40,
            None,
        );
        assert_eq!(credit.signed_amount(), 100);
        assert_eq!(debit.signed_amount(), -40);
    }

    #[test]
    fn test_consumes_grant_balance_by_type() {
        assert!(LedgerEntryType::CreditApplied.consumes_grant_balance());
        assert!(LedgerEntryType::GrantExpired.consumes_grant_balance());
        assert!(!LedgerEntryType::CreditAppliedToUsage.consumes_grant_balance());
        assert!(!LedgerEntryType::GrantRecognized.consumes_grant_balance());
        assert!(!LedgerEntryType::UsageDebit.consumes_grant_balance());
    }

    #[test]
    fn test_consumes_grant_matches_grant_and_status() {
        let grant = UsageCreditId::new();
        let mut entry = make_entry(
            LedgerEntryType::CreditApplied,
            LedgerEntryDirection::Debit,
            40,
            Some(grant),
        );
        assert!(entry.consumes_grant(grant));
        assert!(!entry.consumes_grant(UsageCreditId::new()));

        entry.status = LedgerEntryStatus::Pending;
        assert!(!entry.consumes_grant(grant));
    }

    #[test]
    fn test_informational_entry_never_consumes() {
        let grant = UsageCreditId::new();
        // Modeling drift guard: even a debit-shaped informational entry must not consume.
        let entry = make_entry(
            LedgerEntryType::CreditAppliedToUsage,
            LedgerEntryDirection::Debit,
            40,
            Some(grant),
        );
        assert!(!entry.consumes_grant(grant));
    }

    #[test]
    fn test_posted_entries_are_immutable() {
        assert!(LedgerEntryStatus::Posted.is_immutable());
        assert!(!LedgerEntryStatus::Pending.is_immutable());
    }
}
