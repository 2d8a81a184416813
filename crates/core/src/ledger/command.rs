//! Billing-period transition commands.
//!
//! The transition payload is a tagged union: the first period of a
//! subscription has no previous period to close, so operations that need the
//! previous period's end date (credit expiration) require the standard
//! variant explicitly instead of reaching through an optional field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerline_shared::types::{OrganizationId, SubscriptionId};

use super::error::LedgerError;
use super::period::BillingPeriod;

/// Payload for the common case: one period closes, the next one opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardTransition {
    /// The just-completed billing period. Its end date is the expiration cutoff.
    pub previous_billing_period: BillingPeriod,
    /// The billing period being opened.
    pub new_billing_period: BillingPeriod,
}

/// Payload for a subscription's very first billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialActivation {
    /// The billing period being opened.
    pub new_billing_period: BillingPeriod,
}

/// The shape of a billing-period transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionPayload {
    /// A previous period closes and a new one opens.
    Standard(StandardTransition),
    /// The first period of the subscription opens; nothing closes.
    InitialActivation(InitialActivation),
}

impl TransitionPayload {
    /// Returns the standard payload, or an error for other variants.
    pub fn standard(&self) -> Result<&StandardTransition, LedgerError> {
        match self {
            Self::Standard(standard) => Ok(standard),
            Self::InitialActivation(_) => Err(LedgerError::UnsupportedTransitionPayload),
        }
    }

    /// The billing period being opened, present on every variant.
    #[must_use]
    pub fn new_billing_period(&self) -> &BillingPeriod {
        match self {
            Self::Standard(standard) => &standard.new_billing_period,
            Self::InitialActivation(initial) => &initial.new_billing_period,
        }
    }
}

/// Control object for one billing-period transition of one subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriodTransitionCommand {
    /// The merchant organization the subscription belongs to.
    pub organization_id: OrganizationId,
    /// The subscription being transitioned.
    pub subscription_id: SubscriptionId,
    /// Whether the transition runs in live (vs. test) mode.
    pub livemode: bool,
    /// The transition shape.
    pub payload: TransitionPayload,
}

impl BillingPeriodTransitionCommand {
    /// The instant at or before which outstanding grants expire.
    ///
    /// Only standard transitions have a cutoff; an initial activation has no
    /// previous period and therefore nothing to expire.
    pub fn expiration_cutoff(&self) -> Result<DateTime<Utc>, LedgerError> {
        Ok(self.payload.standard()?.previous_billing_period.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::period::BillingPeriodStatus;
    use chrono::TimeZone;
    use ledgerline_shared::types::BillingPeriodId;

    fn make_period(start: DateTime<Utc>, end: DateTime<Utc>) -> BillingPeriod {
        BillingPeriod {
            id: BillingPeriodId::new(),
            subscription_id: SubscriptionId::new(),
            start_date: start,
            end_date: end,
            status: BillingPeriodStatus::Active,
        }
    }

    #[test]
    fn test_standard_payload_exposes_cutoff() {
        let previous_end = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let command = BillingPeriodTransitionCommand {
            organization_id: OrganizationId::new(),
            subscription_id: SubscriptionId::new(),
            livemode: true,
            payload: TransitionPayload::Standard(StandardTransition {
                previous_billing_period: make_period(
                    Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
                    previous_end,
                ),
                new_billing_period: make_period(
                    previous_end,
                    Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
                ),
            }),
        };

        assert_eq!(command.expiration_cutoff().unwrap(), previous_end);
    }

    #[test]
    fn test_initial_activation_has_no_cutoff() {
        let start = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let command = BillingPeriodTransitionCommand {
            organization_id: OrganizationId::new(),
            subscription_id: SubscriptionId::new(),
            livemode: true,
            payload: TransitionPayload::InitialActivation(InitialActivation {
                new_billing_period: make_period(
                    start,
                    Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
                ),
            }),
        };

        assert!(matches!(
            command.expiration_cutoff(),
            Err(LedgerError::UnsupportedTransitionPayload)
        ));
        assert_eq!(command.payload.new_billing_period().start_date, start);
    }
}
