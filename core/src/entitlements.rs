//! Entitlement resolution — account state to quotas and capability flags.
//!
//! RULE: `DailyQuota::for_status` is the only place the per-tier signal
//! limits are written down. Every other module reads them through it.
//!
//! Resolution is a pure function of its inputs. The same inputs always
//! produce an identical `Entitlements` value, so snapshots are never stored.

use crate::tier::AccountTier;
use serde::{Deserialize, Serialize};

/// Returned by `max_signals_per_day` when the account has no daily cap.
pub const UNLIMITED_SENTINEL: i64 = -1;

/// Display-only remaining count for unlimited accounts.
pub const UNLIMITED_REMAINING: i64 = 999_999;

/// Profile completeness needed for advanced filters and the `profile-80` tag.
pub const ADVANCED_FILTERS_MIN_PROFILE_PCT: u8 = 80;

// ── Account state ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Role {
    Guest,
    User,
    Company,
    Admin,
}

impl Role {
    /// Normalize a raw role string. Unknown values become `Guest`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "user" => Self::User,
            "company" | "empresa" => Self::Company,
            "admin" => Self::Admin,
            _ => Self::Guest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::User => "user",
            Self::Company => "company",
            Self::Admin => "admin",
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum VerificationStatus {
    Unverified,
    VerifiedBasic,
    Pending,
    VerifiedStrong,
}

impl VerificationStatus {
    /// Normalize a raw status, accepting the legacy vocabulary.
    /// Unknown values become `Unverified`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "verified_strong" | "verified" => Self::VerifiedStrong,
            "pending" => Self::Pending,
            "verified_basic" | "basic" => Self::VerifiedBasic,
            _ => Self::Unverified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::VerifiedBasic => "verified_basic",
            Self::Pending => "pending",
            Self::VerifiedStrong => "verified_strong",
        }
    }

    pub fn is_strong(&self) -> bool {
        matches!(self, Self::VerifiedStrong)
    }

    pub fn is_basic_or_higher(&self) -> bool {
        matches!(self, Self::VerifiedBasic | Self::Pending | Self::VerifiedStrong)
    }
}

impl From<String> for VerificationStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

/// Which profile fields the user has filled in. Missing fields read as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileCompleteness {
    pub has_name:      bool,
    pub has_birthdate: bool,
    pub has_gender:    bool,
    pub has_region:    bool,
    pub has_commune:   bool,
    pub has_email:     bool,
}

impl ProfileCompleteness {
    pub fn complete() -> Self {
        Self {
            has_name:      true,
            has_birthdate: true,
            has_gender:    true,
            has_region:    true,
            has_commune:   true,
            has_email:     true,
        }
    }

    fn fields(&self) -> [bool; 6] {
        [
            self.has_name,
            self.has_birthdate,
            self.has_gender,
            self.has_region,
            self.has_commune,
            self.has_email,
        ]
    }

    /// `done / total * 100`, rounded.
    pub fn percent(&self) -> u8 {
        let fields = self.fields();
        let done = fields.iter().filter(|f| **f).count();
        (done as f64 / fields.len() as f64 * 100.0).round() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub role:                Role,
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub profile:             ProfileCompleteness,
}

// ── Quota table ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyQuota {
    Limited(u32),
    Unlimited,
}

impl DailyQuota {
    // `Pending` outranks `VerifiedBasic`. Kept as shipped; see DESIGN.md.
    pub const fn for_status(status: VerificationStatus) -> Self {
        match status {
            VerificationStatus::Unverified => Self::Limited(3),
            VerificationStatus::VerifiedBasic => Self::Limited(15),
            VerificationStatus::Pending => Self::Limited(20),
            VerificationStatus::VerifiedStrong => Self::Unlimited,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Daily cap with `-1` meaning unlimited.
    pub fn max_per_day(&self) -> i64 {
        match self {
            Self::Limited(n) => i64::from(*n),
            Self::Unlimited => UNLIMITED_SENTINEL,
        }
    }

    /// Signals still available after `consumed` today. Never negative.
    pub fn remaining(&self, consumed: i64) -> i64 {
        match self {
            Self::Limited(n) => (i64::from(*n) - consumed.max(0)).max(0),
            Self::Unlimited => UNLIMITED_REMAINING,
        }
    }
}

// ── Entitlements ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlements {
    pub role:                Role,
    pub verification_status: VerificationStatus,
    pub tier:                AccountTier,

    pub max_signals_per_day:  i64,
    pub signals_left_today:   i64,
    pub is_unlimited_signals: bool,

    pub is_verified_basic:  bool,
    pub is_verified_strong: bool,

    pub profile_completeness_pct: u8,

    pub can_access_insights:          bool,
    pub can_access_history:           bool,
    pub can_export:                   bool,
    pub can_access_company_dashboard: bool,
    pub can_edit_answers:             bool,
    pub can_see_advanced_filters:     bool,

    pub unlocked:         Vec<String>,
    pub next_unlock_hint: Option<String>,
}

pub fn resolve(
    role: Role,
    verification_status: VerificationStatus,
    profile: &ProfileCompleteness,
    signals_consumed_today: i64,
) -> Entitlements {
    let is_strong = verification_status.is_strong();
    let is_basic_or_higher = verification_status.is_basic_or_higher();
    let pct = profile.percent();

    let quota = DailyQuota::for_status(verification_status);
    let can_access_company_dashboard = role == Role::Company;

    Entitlements {
        role,
        verification_status,
        tier: AccountTier::from_status(verification_status),

        max_signals_per_day: quota.max_per_day(),
        signals_left_today: quota.remaining(signals_consumed_today),
        is_unlimited_signals: quota.is_unlimited(),

        is_verified_basic: is_basic_or_higher,
        is_verified_strong: is_strong,

        profile_completeness_pct: pct,

        can_access_insights: is_basic_or_higher,
        can_access_history: is_strong,
        can_export: is_strong,
        can_access_company_dashboard,
        can_edit_answers: is_basic_or_higher,
        can_see_advanced_filters: is_strong && pct >= ADVANCED_FILTERS_MIN_PROFILE_PCT,

        unlocked: unlocked_tags(verification_status, pct, can_access_company_dashboard),
        next_unlock_hint: next_unlock_hint(verification_status, pct).map(str::to_string),
    }
}

pub fn resolve_account(account: &AccountState, signals_consumed_today: i64) -> Entitlements {
    resolve(
        account.role,
        account.verification_status,
        &account.profile,
        signals_consumed_today,
    )
}

fn unlocked_tags(status: VerificationStatus, pct: u8, company: bool) -> Vec<String> {
    let mut tags = Vec::new();
    match status {
        VerificationStatus::VerifiedBasic => tags.push("verified-basic"),
        VerificationStatus::Pending => tags.push("pending"),
        VerificationStatus::VerifiedStrong => tags.push("verified-strong"),
        VerificationStatus::Unverified => {}
    }
    if pct >= ADVANCED_FILTERS_MIN_PROFILE_PCT {
        tags.push("profile-80");
    }
    if pct >= 100 {
        tags.push("profile-100");
    }
    if company {
        tags.push("company-dashboard");
    }
    tags.into_iter().map(String::from).collect()
}

/// Verification gaps outrank profile gaps. At most one hint.
fn next_unlock_hint(status: VerificationStatus, pct: u8) -> Option<&'static str> {
    match status {
        VerificationStatus::Unverified => {
            Some("Complete basic verification to unlock results and insights.")
        }
        VerificationStatus::VerifiedBasic => {
            Some("Verify with your national ID for unlimited signals.")
        }
        VerificationStatus::Pending => Some(
            "Your verification is under review. Once approved you will have unlimited signals.",
        ),
        VerificationStatus::VerifiedStrong if pct < ADVANCED_FILTERS_MIN_PROFILE_PCT => {
            Some("Complete your profile to unlock advanced filters.")
        }
        VerificationStatus::VerifiedStrong => None,
    }
}
