//! Ledger account domain type.

use serde::{Deserialize, Serialize};

use ledgerline_shared::types::{LedgerAccountId, OrganizationId, SubscriptionId, UsageMeterId};

/// Balance-tracking unit for one (subscription, usage meter) pair.
///
/// A subscription holds one account per usage meter it has credits or usage
/// for; the account is the scope of balance aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccount {
    /// Unique identifier.
    pub id: LedgerAccountId,
    /// The subscription this account belongs to.
    pub subscription_id: SubscriptionId,
    /// The usage meter this account tracks.
    pub usage_meter_id: UsageMeterId,
    /// The merchant organization this account belongs to.
    pub organization_id: OrganizationId,
    /// Whether this account belongs to live (vs. test) mode.
    pub livemode: bool,
}
