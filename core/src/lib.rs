//! Progression & entitlement engine for the Opina+ signal platform.
//!
//! - `level`        signal totals to levels, titles and weights
//! - `entitlements` account state to daily quotas and capability flags
//! - `ledger`       the persisted progression aggregate
//! - `engine`       one account's ledger with persistence and subscribers

pub mod bounded;
pub mod clock;
pub mod config;
pub mod engine;
pub mod entitlements;
pub mod error;
pub mod event;
pub mod gate;
pub mod ledger;
pub mod level;
pub mod store;
pub mod tier;
pub mod types;
