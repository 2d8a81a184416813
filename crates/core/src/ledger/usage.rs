//! Usage draw-down against outstanding usage-credit grants.

use chrono::Utc;
use serde_json::Map;

use ledgerline_shared::types::LedgerEntryId;

use super::account::LedgerAccount;
use super::balance::GrantBalance;
use super::entry::{LedgerEntryDirection, LedgerEntryRecord, LedgerEntryStatus, LedgerEntryType};
use super::error::LedgerError;
use super::transaction::LedgerTransaction;

/// Computes the ledger entries for one metered usage event on one account.
///
/// Produces a single posted `UsageDebit` for the full usage cost, then draws
/// the cost down from the account's outstanding grants oldest-expiry-first
/// (never-expiring grants last), emitting a consuming `CreditApplied` debit
/// plus an informational `CreditAppliedToUsage` credit per drawn grant. Usage
/// beyond the available credit simply remains uncovered on the usage debit.
///
/// Pure computation; persistence is the caller's responsibility.
///
/// # Errors
///
/// Returns `ZeroAmount`/`NegativeAmount` for a non-positive usage amount.
pub fn draw_down_usage(
    account: &LedgerAccount,
    transaction: &LedgerTransaction,
    usage_amount: i64,
    balances: &[GrantBalance],
) -> Result<Vec<LedgerEntryRecord>, LedgerError> {
    if usage_amount == 0 {
        return Err(LedgerError::ZeroAmount);
    }
    if usage_amount < 0 {
        return Err(LedgerError::NegativeAmount);
    }

    let make_entry = |entry_type: LedgerEntryType,
                      direction: LedgerEntryDirection,
                      amount: i64,
                      source: Option<&GrantBalance>,
                      description: String| LedgerEntryRecord {
        id: LedgerEntryId::new(),
        ledger_transaction_id: transaction.id,
        ledger_account_id: account.id,
        subscription_id: transaction.subscription_id,
        organization_id: transaction.organization_id,
        usage_meter_id: account.usage_meter_id,
        entry_type,
        direction,
        amount,
        status: LedgerEntryStatus::Posted,
        entry_timestamp: Utc::now(),
        metadata: Map::new(),
        source_usage_credit_id: source.map(|balance| balance.usage_credit_id),
        livemode: transaction.livemode,
        description,
    };

    let mut entries = vec![make_entry(
        LedgerEntryType::UsageDebit,
        LedgerEntryDirection::Debit,
        usage_amount,
        None,
        format!("Metered usage on meter {}", account.usage_meter_id),
    )];

    // Draw from the soonest-expiring grants first so long-lived credit
    // survives when short-lived credit would otherwise be forfeited.
    let mut drawable: Vec<&GrantBalance> =
        balances.iter().filter(|b| b.available > 0).collect();
    drawable.sort_by_key(|b| (b.expires_at.is_none(), b.expires_at));

    let mut uncovered = usage_amount;
    for balance in drawable {
        if uncovered == 0 {
            break;
        }
        let applied = balance.available.min(uncovered);
        uncovered -= applied;

        entries.push(make_entry(
            LedgerEntryType::CreditApplied,
            LedgerEntryDirection::Debit,
            applied,
            Some(balance),
            format!("Applied usage credit grant {}", balance.usage_credit_id),
        ));
        entries.push(make_entry(
            LedgerEntryType::CreditAppliedToUsage,
            LedgerEntryDirection::Credit,
            applied,
            Some(balance),
            format!(
                "Credit toward usage cost from grant {}",
                balance.usage_credit_id
            ),
        ));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::LedgerTransactionType;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use ledgerline_shared::types::{
        LedgerAccountId, LedgerTransactionId, OrganizationId, SubscriptionId, UsageCreditId,
        UsageMeterId,
    };

    fn make_account() -> LedgerAccount {
        LedgerAccount {
            id: LedgerAccountId::new(),
            subscription_id: SubscriptionId::new(),
            usage_meter_id: UsageMeterId::new(),
            organization_id: OrganizationId::new(),
            livemode: true,
        }
    }

    fn make_transaction(account: &LedgerAccount) -> LedgerTransaction {
        LedgerTransaction {
            id: LedgerTransactionId::new(),
            transaction_type: LedgerTransactionType::UsageEventProcessed,
            organization_id: account.organization_id,
            subscription_id: account.subscription_id,
            livemode: account.livemode,
            description: None,
            metadata: Map::new(),
            created_at: Utc::now(),
        }
    }

    fn balance(expires_at: Option<DateTime<Utc>>, available: i64) -> GrantBalance {
        GrantBalance {
            usage_credit_id: UsageCreditId::new(),
            expires_at,
            available,
        }
    }

    fn soon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_usage() {
        let account = make_account();
        let transaction = make_transaction(&account);
        assert!(matches!(
            draw_down_usage(&account, &transaction, 0, &[]),
            Err(LedgerError::ZeroAmount)
        ));
        assert!(matches!(
            draw_down_usage(&account, &transaction, -5, &[]),
            Err(LedgerError::NegativeAmount)
        ));
    }

    #[test]
    fn test_usage_without_credit_emits_single_debit() {
        let account = make_account();
        let transaction = make_transaction(&account);
        let entries = draw_down_usage(&account, &transaction, 250, &[]).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, LedgerEntryType::UsageDebit);
        assert_eq!(entries[0].direction, LedgerEntryDirection::Debit);
        assert_eq!(entries[0].amount, 250);
        assert_eq!(entries[0].source_usage_credit_id, None);
    }

    #[test]
    fn test_partial_draw_emits_paired_entries() {
        let account = make_account();
        let transaction = make_transaction(&account);
        let grant = balance(Some(soon()), 1000);

        let entries = draw_down_usage(&account, &transaction, 400, &[grant.clone()]).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].entry_type, LedgerEntryType::UsageDebit);
        assert_eq!(entries[0].amount, 400);

        assert_eq!(entries[1].entry_type, LedgerEntryType::CreditApplied);
        assert_eq!(entries[1].direction, LedgerEntryDirection::Debit);
        assert_eq!(entries[1].amount, 400);
        assert_eq!(entries[1].source_usage_credit_id, Some(grant.usage_credit_id));

        assert_eq!(entries[2].entry_type, LedgerEntryType::CreditAppliedToUsage);
        assert_eq!(entries[2].direction, LedgerEntryDirection::Credit);
        assert_eq!(entries[2].amount, 400);
        assert_eq!(entries[2].source_usage_credit_id, Some(grant.usage_credit_id));
    }

    #[test]
    fn test_overage_stays_on_usage_debit() {
        let account = make_account();
        let transaction = make_transaction(&account);
        let grant = balance(Some(soon()), 300);

        let entries = draw_down_usage(&account, &transaction, 500, &[grant]).unwrap();

        // Usage debit carries the full 500; only 300 is offset by credit.
        assert_eq!(entries[0].amount, 500);
        assert_eq!(entries[1].amount, 300);
        assert_eq!(entries[2].amount, 300);
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_draws_soonest_expiring_grant_first() {
        let account = make_account();
        let transaction = make_transaction(&account);
        let later = balance(Some(soon() + Duration::days(30)), 1000);
        let sooner = balance(Some(soon()), 1000);
        let never = balance(None, 1000);

        let entries = draw_down_usage(
            &account,
            &transaction,
            1500,
            &[later.clone(), never, sooner.clone()],
        )
        .unwrap();

        // 1000 from the soonest-expiring grant, 500 from the next.
        assert_eq!(entries[1].source_usage_credit_id, Some(sooner.usage_credit_id));
        assert_eq!(entries[1].amount, 1000);
        assert_eq!(entries[3].source_usage_credit_id, Some(later.usage_credit_id));
        assert_eq!(entries[3].amount, 500);
    }

    #[test]
    fn test_never_expiring_grant_drawn_last() {
        let account = make_account();
        let transaction = make_transaction(&account);
        let never = balance(None, 1000);
        let expiring = balance(Some(soon()), 100);

        let entries =
            draw_down_usage(&account, &transaction, 300, &[never.clone(), expiring.clone()])
                .unwrap();

        assert_eq!(
            entries[1].source_usage_credit_id,
            Some(expiring.usage_credit_id)
        );
        assert_eq!(entries[1].amount, 100);
        assert_eq!(entries[3].source_usage_credit_id, Some(never.usage_credit_id));
        assert_eq!(entries[3].amount, 200);
    }

    #[test]
    fn test_drained_grants_are_skipped() {
        let account = make_account();
        let transaction = make_transaction(&account);
        let drained = balance(Some(soon()), 0);
        let negative = balance(Some(soon()), -10);

        let entries = draw_down_usage(&account, &transaction, 100, &[drained, negative]).unwrap();
        assert_eq!(entries.len(), 1);
    }
}
