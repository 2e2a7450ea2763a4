//! UI-facing tier vocabulary.
//!
//! Screens speak in tiers (guest / verified_basic / verified_full_ci).
//! The tier is always derived from `VerificationStatus` here and nowhere
//! else, and its limit is read through the canonical quota table.

use crate::entitlements::{DailyQuota, VerificationStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountTier {
    Guest,
    VerifiedBasic,
    VerifiedFullCi,
}

impl AccountTier {
    pub fn from_status(status: VerificationStatus) -> Self {
        match status {
            VerificationStatus::Unverified => Self::Guest,
            VerificationStatus::VerifiedBasic | VerificationStatus::Pending => Self::VerifiedBasic,
            VerificationStatus::VerifiedStrong => Self::VerifiedFullCi,
        }
    }

    /// The least-privileged status that maps onto this tier.
    pub fn representative_status(&self) -> VerificationStatus {
        match self {
            Self::Guest => VerificationStatus::Unverified,
            Self::VerifiedBasic => VerificationStatus::VerifiedBasic,
            Self::VerifiedFullCi => VerificationStatus::VerifiedStrong,
        }
    }

    /// Daily limit of the tier's least-privileged status, `-1` meaning
    /// unlimited. A `Pending` account shares the `VerifiedBasic` tier but
    /// keeps its own larger quota; enforcement always reads
    /// `Entitlements::max_signals_per_day`, never this value.
    pub fn signals_daily_limit(&self) -> i64 {
        DailyQuota::for_status(self.representative_status()).max_per_day()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::VerifiedBasic => "verified_basic",
            Self::VerifiedFullCi => "verified_full_ci",
        }
    }
}
