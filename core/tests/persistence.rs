//! Ledger serialization tests.
//!
//! Every field must round-trip exactly, including bounded collections,
//! their order and their capacities.

use opina_core::{
    clock::FixedClock,
    config::LedgerConfig,
    event::{EventDetail, SignalSourceType},
    ledger::{RecordOptions, SignalLedger},
    store::{LedgerRepository, MemoryRepository, ProgressStore},
};

fn busy_ledger() -> SignalLedger {
    let config = LedgerConfig { mission_goal: 5, dedup_capacity: 4, event_log_capacity: 3 };
    let mut l = SignalLedger::new(&config);
    let start = FixedClock::parse("2024-04-01").unwrap();
    for n in 0..8u64 {
        let detail = EventDetail::new(SignalSourceType::Review, format!("r{n}"), "Review")
            .with_amount(1);
        let opts = RecordOptions::vote(format!("v{n}")).with_event(detail);
        l.record_signal(1, opts, &start.plus_days(n / 3));
    }
    l.complete_onboarding();
    l
}

#[test]
fn json_round_trip_is_exact() {
    let ledger = busy_ledger();
    let json = serde_json::to_string(&ledger).expect("serialize");
    let back: SignalLedger = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(back, ledger);
    assert_eq!(back.counted_vote_ids.capacity(), 4);
    assert_eq!(back.signal_events.capacity(), 3);
    assert_eq!(back.mission_goal, 5);
    assert!(back.counted_vote_ids.contains("v7"));
    assert!(!back.counted_vote_ids.contains("v3"));
    assert_eq!(
        serde_json::to_string(&back).unwrap(),
        json,
        "re-serialization must be byte-identical"
    );
}

#[test]
fn sqlite_round_trip_is_exact() {
    let store = ProgressStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");

    let ledger = busy_ledger();
    store.save_ledger("acct-rt", &ledger).unwrap();
    let back = store.load_ledger("acct-rt").unwrap().expect("saved ledger");

    assert_eq!(back, ledger);
    assert_eq!(store.stored_total_signals("acct-rt").unwrap(), Some(8));
    assert!(store.load_ledger("missing").unwrap().is_none());
}

#[test]
fn save_replaces_previous_snapshot() {
    let store = ProgressStore::in_memory().unwrap();
    store.migrate().unwrap();

    let mut ledger = SignalLedger::default();
    store.save_ledger("acct", &ledger).unwrap();
    ledger.record_signal(4, RecordOptions::default(), &FixedClock::parse("2024-01-01").unwrap());
    store.save_ledger("acct", &ledger).unwrap();

    assert_eq!(store.ledger_count().unwrap(), 1);
    assert_eq!(store.load_ledger("acct").unwrap().unwrap().total_signals, 4);
}

#[test]
fn memory_repository_round_trips() {
    let repo = MemoryRepository::new();
    let ledger = busy_ledger();
    repo.save_ledger("a", &ledger).unwrap();
    assert_eq!(repo.load_ledger("a").unwrap(), Some(ledger));
    assert_eq!(repo.load_ledger("b").unwrap(), None);
}
