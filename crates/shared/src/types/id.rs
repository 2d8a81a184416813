//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `SubscriptionId` where a
//! `LedgerAccountId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(OrganizationId, "Unique identifier for a merchant organization.");
typed_id!(SubscriptionId, "Unique identifier for a subscription.");
typed_id!(UsageMeterId, "Unique identifier for a usage meter.");
typed_id!(
    LedgerAccountId,
    "Unique identifier for a (subscription, usage meter) ledger account."
);
typed_id!(
    LedgerTransactionId,
    "Unique identifier for an atomic group of ledger entries."
);
typed_id!(LedgerEntryId, "Unique identifier for a ledger entry.");
typed_id!(UsageCreditId, "Unique identifier for a usage-credit grant.");
typed_id!(BillingPeriodId, "Unique identifier for a billing period.");
