//! Ledger transaction aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use ledgerline_shared::types::{LedgerTransactionId, OrganizationId, SubscriptionId};

/// What initiated an atomic group of ledger entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerTransactionType {
    /// Scheduled boundary between two billing periods (expirations, rollovers).
    BillingPeriodTransition,
    /// A metered usage event was processed.
    UsageEventProcessed,
    /// A usage-credit grant was issued and recognized.
    CreditGrantRecognized,
    /// Manual balance correction by an operator.
    AdminCreditAdjusted,
}

/// Atomic container grouping one or more ledger entries written together.
///
/// The transaction record itself carries no amounts; it exists so every entry
/// written in one command can be traced back to a single initiating event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Unique identifier.
    pub id: LedgerTransactionId,
    /// What initiated this transaction.
    pub transaction_type: LedgerTransactionType,
    /// The merchant organization this transaction belongs to.
    pub organization_id: OrganizationId,
    /// The subscription this transaction belongs to.
    pub subscription_id: SubscriptionId,
    /// Whether this transaction belongs to live (vs. test) mode.
    pub livemode: bool,
    /// Human-readable description.
    pub description: Option<String>,
    /// Free-form metadata.
    pub metadata: Map<String, Value>,
    /// When the transaction record was created.
    pub created_at: DateTime<Utc>,
}
