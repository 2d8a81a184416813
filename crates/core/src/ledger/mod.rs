//! Usage-credit ledger accounting.
//!
//! This module implements the core ledger functionality:
//! - Ledger entries (credits and debits against usage-credit grants)
//! - Ledger transactions (atomic entry groups)
//! - Ledger accounts (one per subscription/usage-meter pair)
//! - Usage-credit grants and recognition
//! - Available-balance aggregation
//! - Usage draw-down against outstanding grants
//! - Credit expiration at billing-period boundaries
//! - Billing-period transition commands
//! - Error types for ledger operations

pub mod account;
pub mod balance;
pub mod command;
pub mod credit;
pub mod entry;
pub mod error;
pub mod expiration;
pub mod period;
pub mod transaction;
pub mod usage;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod expiration_props;

pub use account::LedgerAccount;
pub use balance::{available_balances, GrantBalance};
pub use command::{
    BillingPeriodTransitionCommand, InitialActivation, StandardTransition, TransitionPayload,
};
pub use credit::UsageCreditGrant;
pub use entry::{LedgerEntryDirection, LedgerEntryRecord, LedgerEntryStatus, LedgerEntryType};
pub use error::LedgerError;
pub use expiration::{expire_credits_at_period_end, ExpirationOutcome, ExpireCreditsInput};
pub use period::{BillingPeriod, BillingPeriodStatus};
pub use transaction::{LedgerTransaction, LedgerTransactionType};
pub use usage::draw_down_usage;
