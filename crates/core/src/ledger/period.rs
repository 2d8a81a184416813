//! Billing period domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerline_shared::types::{BillingPeriodId, SubscriptionId};

/// Billing period status in the subscription lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriodStatus {
    /// Period has not started yet.
    Upcoming,
    /// Period is the subscription's current cycle.
    Active,
    /// Period has been closed by a billing-period transition.
    Completed,
}

impl BillingPeriodStatus {
    /// Returns true if a transition may close a period in this status.
    #[must_use]
    pub fn is_transitionable(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// One billing cycle of a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    /// Unique identifier.
    pub id: BillingPeriodId,
    /// The subscription this period belongs to.
    pub subscription_id: SubscriptionId,
    /// Inclusive period start.
    pub start_date: DateTime<Utc>,
    /// Exclusive period end; the expiration cutoff at transition time.
    pub end_date: DateTime<Utc>,
    /// Lifecycle status.
    pub status: BillingPeriodStatus,
}

impl BillingPeriod {
    /// Returns true if this period is due for a billing-period transition.
    #[must_use]
    pub fn is_due_for_transition(&self, now: DateTime<Utc>) -> bool {
        self.status.is_transitionable() && self.end_date <= now
    }

    /// Returns true if the instant falls within this period.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start_date <= instant && instant < self.end_date
    }
}
