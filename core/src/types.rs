//! Shared primitive types used across the engine.

/// A stable identifier for the account that owns a ledger.
pub type AccountId = String;

/// A caller-supplied idempotency key for one counted vote.
pub type VoteId = String;

/// Identifier of one entry in the activity log.
pub type EventId = String;
