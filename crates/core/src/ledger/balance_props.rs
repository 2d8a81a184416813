//! Property-based tests for available-balance aggregation.

use chrono::Utc;
use proptest::prelude::*;
use serde_json::Map;

use ledgerline_shared::types::{
    LedgerAccountId, LedgerEntryId, LedgerTransactionId, OrganizationId, SubscriptionId,
    UsageCreditId, UsageMeterId,
};

use super::balance::available_balances;
use super::credit::UsageCreditGrant;
use super::entry::{LedgerEntryDirection, LedgerEntryRecord, LedgerEntryStatus, LedgerEntryType};

/// Strategy for issued amounts (1 to 1,000,000 smallest units).
fn issued_amount() -> impl Strategy<Value = i64> {
    1i64..1_000_000i64
}

/// Strategy for consuming entry amounts.
fn entry_amount() -> impl Strategy<Value = i64> {
    1i64..10_000i64
}

fn make_grant(issued: i64) -> UsageCreditGrant {
    UsageCreditGrant {
        id: UsageCreditId::new(),
        subscription_id: SubscriptionId::new(),
        usage_meter_id: UsageMeterId::new(),
        issued_amount: issued,
        expires_at: None,
        livemode: true,
    }
}

fn make_entry(
    entry_type: LedgerEntryType,
    direction: LedgerEntryDirection,
    status: LedgerEntryStatus,
    amount: i64,
    grant: UsageCreditId,
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
        status,
        entry_timestamp: Utc::now(),
        metadata: Map::new(),
        source_usage_credit_id: Some(grant),
        livemode: true,
        description: String::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// An unconsumed grant's available balance equals its issued amount.
    #[test]
    fn prop_unconsumed_balance_equals_issued(issued in issued_amount()) {
        let grant = make_grant(issued);
        let balances = available_balances(&[grant], &[]);
        prop_assert_eq!(balances[0].available, issued);
    }

    /// Available balance is issued minus the sum of posted consuming debits.
    #[test]
    fn prop_balance_is_issued_minus_consumed(
        issued in issued_amount(),
        amounts in prop::collection::vec(entry_amount(), 0..10),
    ) {
        let grant = make_grant(issued);
        let entries: Vec<LedgerEntryRecord> = amounts
            .iter()
            .map(|&amount| {
                make_entry(
                    LedgerEntryType::CreditApplied,
                    LedgerEntryDirection::Debit,
                    LedgerEntryStatus::Posted,
                    amount,
                    grant.id,
                )
            })
            .collect();

        let consumed: i64 = amounts.iter().sum();
        let balances = available_balances(&[grant], &entries);
        prop_assert_eq!(balances[0].available, issued - consumed);
    }

    /// Informational credit-toward-usage entries never change the balance.
    #[test]
    fn prop_informational_entries_do_not_consume(
        issued in issued_amount(),
        amounts in prop::collection::vec(entry_amount(), 1..10),
    ) {
        let grant = make_grant(issued);
        let entries: Vec<LedgerEntryRecord> = amounts
            .iter()
            .map(|&amount| {
                make_entry(
                    LedgerEntryType::CreditAppliedToUsage,
                    LedgerEntryDirection::Credit,
                    LedgerEntryStatus::Posted,
                    amount,
                    grant.id,
                )
            })
            .collect();

        let balances = available_balances(&[grant], &entries);
        prop_assert_eq!(balances[0].available, issued);
    }

    /// Pending entries never change the balance.
    #[test]
    fn prop_pending_entries_do_not_consume(
        issued in issued_amount(),
        amounts in prop::collection::vec(entry_amount(), 1..10),
    ) {
        let grant = make_grant(issued);
        let entries: Vec<LedgerEntryRecord> = amounts
            .iter()
            .map(|&amount| {
                make_entry(
                    LedgerEntryType::CreditApplied,
                    LedgerEntryDirection::Debit,
                    LedgerEntryStatus::Pending,
                    amount,
                    grant.id,
                )
            })
            .collect();

        let balances = available_balances(&[grant], &entries);
        prop_assert_eq!(balances[0].available, issued);
    }

    /// Output has one balance per grant, in input order.
    #[test]
    fn prop_one_balance_per_grant_in_order(
        issued in prop::collection::vec(issued_amount(), 0..10),
    ) {
        let grants: Vec<UsageCreditGrant> = issued.iter().map(|&i| make_grant(i)).collect();
        let balances = available_balances(&grants, &[]);

        prop_assert_eq!(balances.len(), grants.len());
        for (grant, balance) in grants.iter().zip(&balances) {
            prop_assert_eq!(balance.usage_credit_id, grant.id);
            prop_assert_eq!(balance.available, grant.issued_amount);
        }
    }
}
