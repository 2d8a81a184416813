//! Ledger error types for validation and state errors.

use ledgerline_shared::types::{LedgerAccountId, UsageCreditId};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Command Errors ==========
    /// The transition payload does not carry a previous billing period.
    #[error("Billing-period transition payload must be the standard variant with a previous billing period")]
    UnsupportedTransitionPayload,

    // ========== Validation Errors ==========
    /// Entry amount cannot be zero.
    #[error("Entry amount cannot be zero")]
    ZeroAmount,

    /// Entry amount cannot be negative.
    #[error("Entry amount cannot be negative")]
    NegativeAmount,

    /// Ledger account not found.
    #[error("Ledger account not found: {0}")]
    AccountNotFound(LedgerAccountId),

    /// Usage-credit grant not found.
    #[error("Usage-credit grant not found: {0}")]
    GrantNotFound(UsageCreditId),

    // ========== External Failures ==========
    /// Database error from the balance-aggregation collaborator or persistence.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for logs and job reports.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedTransitionPayload => "UNSUPPORTED_TRANSITION_PAYLOAD",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::GrantNotFound(_) => "GRANT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
