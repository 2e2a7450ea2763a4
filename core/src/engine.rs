//! The progression engine — one account's ledger and everything that
//! observes it.
//!
//! MUTATION ORDER (fixed, for every applied change):
//!   1. Ledger transition, on a working copy
//!   2. Write-through save of the working copy
//!   3. Working copy replaces the live ledger
//!   4. Subscriber notification, in subscription order
//!
//! If step 2 fails nothing after it runs and the live ledger is unchanged.
//!
//! RULES:
//!   - Only the engine mutates its ledger. Mutating methods take `&mut self`,
//!     so each read-modify-write is exclusive for the engine's owner.
//!     Hosts sharing an engine across threads wrap it in their own lock.
//!   - Duplicates and no-op latches are not saved and not broadcast.
//!   - Entitlements are recomputed on every call, never cached.

use crate::{
    clock::Clock,
    config::EngineConfig,
    entitlements::{resolve_account, AccountState, Entitlements},
    error::EngineResult,
    gate::{check_capability, check_signal_quota, AccessDecision, Capability},
    ledger::{RecordOptions, RecordOutcome, SignalLedger},
    store::{LedgerRepository, MemoryRepository},
    types::AccountId,
};

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&SignalLedger) + Send>;

pub struct ProgressionEngine {
    account_id:   AccountId,
    config:       EngineConfig,
    ledger:       SignalLedger,
    repository:   Box<dyn LedgerRepository>,
    listeners:    Vec<(SubscriptionId, Listener)>,
    next_sub_id:  SubscriptionId,
}

impl ProgressionEngine {
    /// Load the account's ledger from `repository`, or start an empty one.
    pub fn open(
        account_id: AccountId,
        config: EngineConfig,
        repository: Box<dyn LedgerRepository>,
    ) -> EngineResult<Self> {
        let ledger = match repository.load_ledger(&account_id)? {
            Some(ledger) => {
                log::debug!(
                    "account={account_id} ledger loaded (total={}, streak={})",
                    ledger.total_signals,
                    ledger.streak_days
                );
                ledger
            }
            None => {
                log::debug!("account={account_id} no ledger found, starting empty");
                SignalLedger::new(&config.ledger)
            }
        };
        Ok(Self {
            account_id,
            config,
            ledger,
            repository,
            listeners: Vec::new(),
            next_sub_id: 0,
        })
    }

    /// An engine backed by a fresh process-local repository.
    pub fn in_memory(account_id: AccountId, config: EngineConfig) -> EngineResult<Self> {
        Self::open(account_id, config, Box::new(MemoryRepository::new()))
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &SignalLedger {
        &self.ledger
    }

    /// Record a countable action and return the resulting snapshot.
    /// A replayed vote id returns the unchanged snapshot.
    pub fn record_signal(
        &mut self,
        delta: i64,
        options: RecordOptions,
        clock: &dyn Clock,
    ) -> EngineResult<SignalLedger> {
        let mut next = self.ledger.clone();
        match next.record_signal(delta, options, clock) {
            RecordOutcome::Applied => self.commit(next)?,
            RecordOutcome::Duplicate => {}
        }
        Ok(self.ledger.clone())
    }

    /// Latch today's mission as celebrated. Returns true if state changed.
    pub fn mark_mission_celebrated(&mut self) -> EngineResult<bool> {
        let mut next = self.ledger.clone();
        let changed = next.mark_mission_celebrated();
        if changed {
            self.commit(next)?;
        }
        Ok(changed)
    }

    /// Latch onboarding as done. Returns true if state changed.
    pub fn complete_onboarding(&mut self) -> EngineResult<bool> {
        let mut next = self.ledger.clone();
        let changed = next.complete_onboarding();
        if changed {
            self.commit(next)?;
        }
        Ok(changed)
    }

    /// Entitlements for `account`, using today's count from this ledger.
    pub fn entitlements(&self, account: &AccountState, clock: &dyn Clock) -> Entitlements {
        let consumed = self.ledger.signals_consumed_on(clock.today());
        resolve_account(account, consumed)
    }

    /// Whether `account` may cast another signal today.
    pub fn check_signal_quota(&self, account: &AccountState, clock: &dyn Clock) -> AccessDecision {
        check_signal_quota(&self.entitlements(account, clock))
    }

    pub fn check_capability(
        &self,
        account: &AccountState,
        capability: Capability,
        clock: &dyn Clock,
    ) -> AccessDecision {
        check_capability(&self.entitlements(account, clock), capability)
    }

    /// Register a listener called with the new snapshot after every change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SignalLedger) + Send + 'static,
    {
        let id = self.next_sub_id;
        self.next_sub_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Save `next`, then adopt it. A failed save leaves the live ledger
    /// untouched, so the caller can retry the same call.
    fn commit(&mut self, next: SignalLedger) -> EngineResult<()> {
        self.repository.save_ledger(&self.account_id, &next)?;
        self.ledger = next;
        for (_, listener) in &mut self.listeners {
            listener(&self.ledger);
        }
        Ok(())
    }
}
