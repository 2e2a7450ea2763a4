//! Access gate — allow/deny decisions for route guards and quota banners.
//!
//! A denial is a business outcome with an actionable message, not a fault.

use crate::entitlements::Entitlements;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Insights,
    History,
    Export,
    CompanyDashboard,
    EditAnswers,
    AdvancedFilters,
}

impl Capability {
    /// Heading shown on the paywall when this capability is denied.
    pub fn paywall_title(&self) -> &'static str {
        match self {
            Self::Export | Self::CompanyDashboard => "Company Dashboard",
            Self::History => "Full History",
            _ => "Restricted Access",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenialReason {
    MissingCapability {
        capability: Capability,
        title:      String,
        hint:       Option<String>,
    },
    DailyQuotaExhausted {
        max_signals_per_day: i64,
        message:             String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    Allowed,
    Denied(DenialReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

impl Entitlements {
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Insights => self.can_access_insights,
            Capability::History => self.can_access_history,
            Capability::Export => self.can_export,
            Capability::CompanyDashboard => self.can_access_company_dashboard,
            Capability::EditAnswers => self.can_edit_answers,
            Capability::AdvancedFilters => self.can_see_advanced_filters,
        }
    }
}

pub fn check_capability(entitlements: &Entitlements, capability: Capability) -> AccessDecision {
    if entitlements.allows(capability) {
        return AccessDecision::Allowed;
    }
    log::debug!(
        "capability={capability:?} denied for status={}",
        entitlements.verification_status.as_str()
    );
    AccessDecision::Denied(DenialReason::MissingCapability {
        capability,
        title: capability.paywall_title().to_string(),
        hint: entitlements.next_unlock_hint.clone(),
    })
}

/// Whether one more signal may be cast today.
pub fn check_signal_quota(entitlements: &Entitlements) -> AccessDecision {
    if entitlements.is_unlimited_signals || entitlements.signals_left_today > 0 {
        return AccessDecision::Allowed;
    }

    let mut message = format!(
        "You've used all {} signals for today. Come back tomorrow.",
        entitlements.max_signals_per_day
    );
    if !entitlements.is_verified_strong {
        message.push_str(" Verify your identity to raise your daily limit.");
    }

    AccessDecision::Denied(DenialReason::DailyQuotaExhausted {
        max_signals_per_day: entitlements.max_signals_per_day,
        message,
    })
}
