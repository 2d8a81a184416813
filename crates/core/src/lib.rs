//! Core billing-ledger logic for Ledgerline.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, balance calculations, and billing-period transition rules
//! live here.
//!
//! # Modules
//!
//! - `ledger` - Usage-credit ledger accounting

pub mod ledger;
