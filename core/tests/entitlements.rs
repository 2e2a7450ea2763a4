//! Entitlement resolver tests.
//!
//! Tests cover: quota table, remaining-count floor, capability flags,
//! unlock tags and hints, tier adapter, access gate decisions.

use opina_core::{
    entitlements::{
        resolve, resolve_account, AccountState, DailyQuota, ProfileCompleteness, Role,
        VerificationStatus, UNLIMITED_REMAINING,
    },
    gate::{check_capability, check_signal_quota, AccessDecision, Capability, DenialReason},
    tier::AccountTier,
};

const ALL_STATUSES: [VerificationStatus; 4] = [
    VerificationStatus::Unverified,
    VerificationStatus::VerifiedBasic,
    VerificationStatus::Pending,
    VerificationStatus::VerifiedStrong,
];

fn empty() -> ProfileCompleteness {
    ProfileCompleteness::default()
}

#[test]
fn quota_table_per_status() {
    let expected = [
        (VerificationStatus::Unverified, 3),
        (VerificationStatus::VerifiedBasic, 15),
        (VerificationStatus::Pending, 20),
        (VerificationStatus::VerifiedStrong, -1),
    ];
    for (status, max) in expected {
        let e = resolve(Role::User, status, &empty(), 0);
        assert_eq!(e.max_signals_per_day, max, "wrong quota for {status:?}");
    }

    let strong = resolve(Role::User, VerificationStatus::VerifiedStrong, &empty(), 0);
    assert_eq!(strong.signals_left_today, UNLIMITED_REMAINING);
    assert!(strong.is_unlimited_signals);
}

#[test]
fn remaining_is_never_negative() {
    for status in ALL_STATUSES {
        let quota = DailyQuota::for_status(status);
        for consumed in -5i64..=40 {
            let e = resolve(Role::User, status, &empty(), consumed);
            let expected = match quota {
                DailyQuota::Limited(q) => (i64::from(q) - consumed.max(0)).max(0),
                DailyQuota::Unlimited => UNLIMITED_REMAINING,
            };
            assert_eq!(
                e.signals_left_today, expected,
                "status={status:?} consumed={consumed}"
            );
            assert!(e.signals_left_today >= 0);
        }
    }
}

#[test]
fn company_dashboard_is_independent_of_verification() {
    let e = resolve(Role::Company, VerificationStatus::Unverified, &empty(), 0);
    assert!(e.can_access_company_dashboard);
    assert!(!e.can_access_insights);
    assert!(e.unlocked.contains(&"company-dashboard".to_string()));

    let strong_user = resolve(Role::User, VerificationStatus::VerifiedStrong, &empty(), 0);
    assert!(!strong_user.can_access_company_dashboard);
}

#[test]
fn capability_flags_follow_verification_strength() {
    let basic = resolve(Role::User, VerificationStatus::VerifiedBasic, &empty(), 0);
    assert!(basic.can_access_insights);
    assert!(basic.can_edit_answers);
    assert!(!basic.can_access_history);
    assert!(!basic.can_export);

    let pending = resolve(Role::User, VerificationStatus::Pending, &empty(), 0);
    assert!(pending.can_access_insights);
    assert!(!pending.can_access_history);

    let strong = resolve(Role::User, VerificationStatus::VerifiedStrong, &empty(), 0);
    assert!(strong.can_access_history);
    assert!(strong.can_export);
}

#[test]
fn advanced_filters_need_strong_and_profile_80() {
    let mut five_of_six = ProfileCompleteness::complete();
    five_of_six.has_gender = false;
    let mut four_of_six = five_of_six;
    four_of_six.has_region = false;

    let strong = VerificationStatus::VerifiedStrong;
    assert!(resolve(Role::User, strong, &five_of_six, 0).can_see_advanced_filters);
    assert!(!resolve(Role::User, strong, &four_of_six, 0).can_see_advanced_filters);
    assert!(
        !resolve(Role::User, VerificationStatus::VerifiedBasic, &ProfileCompleteness::complete(), 0)
            .can_see_advanced_filters
    );
}

#[test]
fn unlocked_tags_and_hint_priority() {
    let full = ProfileCompleteness::complete();

    let unverified = resolve(Role::User, VerificationStatus::Unverified, &full, 0);
    assert_eq!(unverified.unlocked, vec!["profile-80", "profile-100"]);
    // Verification gap wins over a complete profile.
    assert!(unverified.next_unlock_hint.as_deref().unwrap().contains("basic verification"));

    let strong_sparse = resolve(Role::User, VerificationStatus::VerifiedStrong, &empty(), 0);
    assert_eq!(strong_sparse.unlocked, vec!["verified-strong"]);
    assert!(strong_sparse.next_unlock_hint.as_deref().unwrap().contains("profile"));

    let strong_full = resolve(Role::User, VerificationStatus::VerifiedStrong, &full, 0);
    assert!(strong_full.next_unlock_hint.is_none());
}

#[test]
fn resolution_is_referentially_transparent() {
    let account = AccountState {
        role: Role::Company,
        verification_status: VerificationStatus::Pending,
        profile: ProfileCompleteness { has_email: true, ..Default::default() },
    };
    let a = resolve_account(&account, 7);
    let b = resolve_account(&account, 7);
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn unknown_raw_values_are_most_restrictive() {
    let account: AccountState = serde_json::from_str(
        r#"{"role": "overlord", "verification_status": "gold", "profile": {"has_name": true}}"#,
    )
    .expect("account state parses");
    assert_eq!(account.role, Role::Guest);
    assert_eq!(account.verification_status, VerificationStatus::Unverified);
    assert!(account.profile.has_name);
    assert!(!account.profile.has_email);

    let e = resolve_account(&account, 0);
    assert_eq!(e.max_signals_per_day, 3);
    assert!(!e.can_access_insights);
}

#[test]
fn tier_is_derived_from_status() {
    assert_eq!(AccountTier::from_status(VerificationStatus::Unverified), AccountTier::Guest);
    assert_eq!(AccountTier::from_status(VerificationStatus::Pending), AccountTier::VerifiedBasic);
    assert_eq!(
        AccountTier::from_status(VerificationStatus::VerifiedStrong),
        AccountTier::VerifiedFullCi
    );
    assert_eq!(AccountTier::Guest.signals_daily_limit(), 3);
    assert_eq!(AccountTier::VerifiedBasic.signals_daily_limit(), 15);
    assert_eq!(AccountTier::VerifiedFullCi.signals_daily_limit(), -1);

    let e = resolve(Role::User, VerificationStatus::VerifiedBasic, &empty(), 0);
    assert_eq!(e.tier, AccountTier::VerifiedBasic);
}

#[test]
fn pending_quota_is_not_the_tier_limit() {
    let e = resolve(Role::User, VerificationStatus::Pending, &empty(), 0);
    assert_eq!(e.tier, AccountTier::VerifiedBasic);
    assert_eq!(e.tier.signals_daily_limit(), 15);
    assert_eq!(e.max_signals_per_day, 20, "the enforced quota comes from the status");
    assert_eq!(e.signals_left_today, 20);

    let e = resolve(Role::User, VerificationStatus::Pending, &empty(), 15);
    assert_eq!(e.signals_left_today, 5);
    assert!(check_signal_quota(&e).is_allowed());
}

#[test]
fn exhausted_quota_is_an_actionable_denial() {
    let e = resolve(Role::User, VerificationStatus::Unverified, &empty(), 3);
    assert_eq!(e.signals_left_today, 0);
    match check_signal_quota(&e) {
        AccessDecision::Denied(DenialReason::DailyQuotaExhausted { max_signals_per_day, message }) => {
            assert_eq!(max_signals_per_day, 3);
            assert!(message.contains("tomorrow"), "message should be actionable: {message}");
            assert!(message.contains("Verify"), "message should suggest verifying: {message}");
        }
        other => panic!("expected quota denial, got {other:?}"),
    }

    let under = resolve(Role::User, VerificationStatus::Unverified, &empty(), 2);
    assert!(check_signal_quota(&under).is_allowed());

    let strong = resolve(Role::User, VerificationStatus::VerifiedStrong, &empty(), 10_000);
    assert!(check_signal_quota(&strong).is_allowed());
}

#[test]
fn capability_denial_carries_paywall_title() {
    let e = resolve(Role::User, VerificationStatus::VerifiedBasic, &empty(), 0);
    assert!(check_capability(&e, Capability::Insights).is_allowed());
    match check_capability(&e, Capability::History) {
        AccessDecision::Denied(DenialReason::MissingCapability { capability, title, hint }) => {
            assert_eq!(capability, Capability::History);
            assert_eq!(title, "Full History");
            assert!(hint.is_some());
        }
        other => panic!("expected capability denial, got {other:?}"),
    }
}
