//! Usage-credit grants and recognition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Map;

use ledgerline_shared::types::{SubscriptionId, UsageCreditId, UsageMeterId};

use super::account::LedgerAccount;
use super::entry::{LedgerEntryDirection, LedgerEntryRecord, LedgerEntryStatus, LedgerEntryType};
use super::transaction::LedgerTransaction;
use ledgerline_shared::types::LedgerEntryId;

/// An allotment of usage credit issued to a subscription for one usage meter.
///
/// Immutable once issued. Expiration is enforced by emitting a `GrantExpired`
/// debit against the remaining balance, never by mutating the grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCreditGrant {
    /// Unique identifier.
    pub id: UsageCreditId,
    /// The subscription the credit was granted to.
    pub subscription_id: SubscriptionId,
    /// The usage meter the credit applies to.
    pub usage_meter_id: UsageMeterId,
    /// Issued amount in the smallest unit of the meter's measure.
    pub issued_amount: i64,
    /// Absolute expiration instant. `None` means the grant never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether this grant belongs to live (vs. test) mode.
    pub livemode: bool,
}

impl UsageCreditGrant {
    /// Returns true if the grant is expired as of `cutoff`.
    ///
    /// A grant expiring exactly at the cutoff instant counts as expired.
    #[must_use]
    pub fn is_expired_at(&self, cutoff: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= cutoff)
    }

    /// Builds the posted credit entry recognizing this grant on its account.
    ///
    /// Tenancy fields are copied from the enclosing ledger transaction, so a
    /// grant issued through a test-mode command produces a test-mode entry.
    #[must_use]
    pub fn recognition_entry(
        &self,
        account: &LedgerAccount,
        transaction: &LedgerTransaction,
    ) -> LedgerEntryRecord {
        LedgerEntryRecord {
            id: LedgerEntryId::new(),
            ledger_transaction_id: transaction.id,
            ledger_account_id: account.id,
            subscription_id: transaction.subscription_id,
            organization_id: transaction.organization_id,
            usage_meter_id: account.usage_meter_id,
            entry_type: LedgerEntryType::GrantRecognized,
            direction: LedgerEntryDirection::Credit,
            amount: self.issued_amount,
            status: LedgerEntryStatus::Posted,
            entry_timestamp: Utc::now(),
            metadata: Map::new(),
            source_usage_credit_id: Some(self.id),
            livemode: transaction.livemode,
            description: format!("Recognized usage credit grant {}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ledgerline_shared::types::{LedgerAccountId, LedgerTransactionId, OrganizationId};

    use crate::ledger::transaction::LedgerTransactionType;

    fn make_grant(expires_at: Option<DateTime<Utc>>) -> UsageCreditGrant {
        UsageCreditGrant {
            id: UsageCreditId::new(),
            subscription_id: SubscriptionId::new(),
            usage_meter_id: UsageMeterId::new(),
            issued_amount: 500,
            expires_at,
            livemode: true,
        }
    }

    #[test]
    fn test_never_expiring_grant() {
        let grant = make_grant(None);
        assert!(!grant.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let cutoff = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let grant = make_grant(Some(cutoff));
        assert!(grant.is_expired_at(cutoff));
        assert!(!grant.is_expired_at(cutoff - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_recognition_entry_links_grant_and_copies_tenancy() {
        let grant = make_grant(None);
        let account = LedgerAccount {
            id: LedgerAccountId::new(),
            subscription_id: grant.subscription_id,
            usage_meter_id: grant.usage_meter_id,
            organization_id: OrganizationId::new(),
            livemode: false,
        };
        let transaction = LedgerTransaction {
            id: LedgerTransactionId::new(),
            transaction_type: LedgerTransactionType::CreditGrantRecognized,
            organization_id: account.organization_id,
            subscription_id: grant.subscription_id,
            livemode: false,
            description: None,
            metadata: Map::new(),
            created_at: Utc::now(),
        };

        let entry = grant.recognition_entry(&account, &transaction);
        assert_eq!(entry.entry_type, LedgerEntryType::GrantRecognized);
        assert_eq!(entry.direction, LedgerEntryDirection::Credit);
        assert_eq!(entry.amount, 500);
        assert_eq!(entry.source_usage_credit_id, Some(grant.id));
        assert_eq!(entry.ledger_transaction_id, transaction.id);
        // Livemode follows the transaction, not the grant.
        assert!(!entry.livemode);
        assert!(entry.description.contains(&grant.id.to_string()));
    }
}
