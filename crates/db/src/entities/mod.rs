//! `SeaORM` entity definitions.

pub mod billing_periods;
pub mod ledger_accounts;
pub mod ledger_entries;
pub mod ledger_transactions;
pub mod organizations;
pub mod sea_orm_active_enums;
pub mod subscriptions;
pub mod usage_credits;
pub mod usage_meters;
