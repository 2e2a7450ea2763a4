//! Signal ledger — the persisted progression aggregate for one account.
//!
//! TRANSITIONS (the only ways state changes):
//!   - record_signal            counters, streak, mission, dedup, activity
//!   - mark_mission_celebrated  one-way latch on today's mission
//!   - complete_onboarding      one-way latch
//!
//! RULES:
//!   - Level fields are derived. They are overwritten after every
//!     `record_signal` and never set by callers.
//!   - `completed` and `celebrated` never revert within a mission day.
//!   - A vote id is counted at most once while it is in the dedup window.
//!   - `total_signals` never goes below zero.

use crate::{
    bounded::{EventLog, VoteIdSet},
    clock::Clock,
    config::LedgerConfig,
    event::{EventDetail, SignalEvent},
    level::{compute_level, LevelInfo},
    types::VoteId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMission {
    /// `None` until the first signal ever recorded.
    pub date:       Option<NaiveDate>,
    pub count:      i64,
    pub goal:       u32,
    pub completed:  bool,
    pub celebrated: bool,
}

impl DailyMission {
    fn fresh(date: Option<NaiveDate>, goal: u32) -> Self {
        Self {
            date,
            count: 0,
            goal,
            completed: false,
            celebrated: false,
        }
    }
}

/// Optional inputs to `record_signal`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOptions {
    #[serde(default)]
    pub vote_id:      Option<VoteId>,
    #[serde(default)]
    pub event_detail: Option<EventDetail>,
}

impl RecordOptions {
    pub fn vote(vote_id: impl Into<VoteId>) -> Self {
        Self {
            vote_id: Some(vote_id.into()),
            event_detail: None,
        }
    }

    pub fn event(detail: EventDetail) -> Self {
        Self {
            vote_id: None,
            event_detail: Some(detail),
        }
    }

    pub fn with_event(mut self, detail: EventDetail) -> Self {
        self.event_detail = Some(detail);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    Applied,
    /// The vote id was already counted. Nothing changed.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalLedger {
    pub total_signals:    u64,
    pub level:            u32,
    pub level_title:      String,
    pub next_level_at:    u64,
    pub progress_percent: u8,

    pub signals_today:    i64,
    pub last_signal_date: Option<NaiveDate>,
    pub streak_days:      u32,

    pub mission_goal:     u32,
    pub daily_mission:    DailyMission,
    pub onboarding_done:  bool,

    pub counted_vote_ids: VoteIdSet,
    pub signal_events:    EventLog,
}

impl Default for SignalLedger {
    fn default() -> Self {
        Self::new(&LedgerConfig::default())
    }
}

impl SignalLedger {
    /// An empty ledger, as created at an account's first use.
    pub fn new(config: &LedgerConfig) -> Self {
        let level = compute_level(0);
        Self {
            total_signals: 0,
            level: level.level,
            level_title: level.title,
            next_level_at: level.next_threshold,
            progress_percent: level.progress_percent,
            signals_today: 0,
            last_signal_date: None,
            streak_days: 0,
            mission_goal: config.mission_goal,
            daily_mission: DailyMission::fresh(None, config.mission_goal),
            onboarding_done: false,
            counted_vote_ids: VoteIdSet::with_capacity(config.dedup_capacity),
            signal_events: EventLog::with_capacity(config.event_log_capacity),
        }
    }

    /// Apply `delta` signals. This is the ledger's only counting transition.
    pub fn record_signal(
        &mut self,
        delta: i64,
        options: RecordOptions,
        clock: &dyn Clock,
    ) -> RecordOutcome {
        let RecordOptions { vote_id, event_detail } = options;

        // 1. Replay protection.
        if let Some(id) = &vote_id {
            if self.counted_vote_ids.contains(id) {
                log::debug!("vote_id={id} already counted, skipping");
                return RecordOutcome::Duplicate;
            }
        }

        let today = clock.today();

        // 2. Day rollover and streak.
        self.roll_day(today);

        // 3. Mission rollover.
        if self.daily_mission.date != Some(today) {
            self.daily_mission = DailyMission::fresh(Some(today), self.mission_goal);
        }

        // 4. Apply to today's counters.
        self.signals_today = self.signals_today.saturating_add(delta);
        self.daily_mission.count = self.daily_mission.count.saturating_add(delta);
        if !self.daily_mission.completed
            && self.daily_mission.count >= i64::from(self.daily_mission.goal)
        {
            self.daily_mission.completed = true;
            log::info!(
                "date={today} daily mission completed ({}/{})",
                self.daily_mission.count,
                self.daily_mission.goal
            );
        }

        // 5. Totals, floored at zero.
        self.total_signals = apply_floored(self.total_signals, delta);

        // 6. Dedup window.
        if let Some(id) = vote_id {
            self.counted_vote_ids.insert(id);
        }

        // 7. Activity log.
        if let Some(detail) = event_detail {
            self.signal_events.push_newest(SignalEvent::stamp(detail, clock));
        }

        // 8. Derived fields.
        self.refresh_level();

        RecordOutcome::Applied
    }

    /// Latch `celebrated` on a completed mission. Returns true if it changed.
    pub fn mark_mission_celebrated(&mut self) -> bool {
        let mission = &mut self.daily_mission;
        if mission.completed && !mission.celebrated {
            mission.celebrated = true;
            return true;
        }
        false
    }

    /// Latch onboarding as done. Returns true if it changed.
    pub fn complete_onboarding(&mut self) -> bool {
        let changed = !self.onboarding_done;
        self.onboarding_done = true;
        changed
    }

    /// Signals consumed on `today` as the quota check sees them.
    /// A ledger last touched on an earlier day has consumed nothing today.
    pub fn signals_consumed_on(&self, today: NaiveDate) -> i64 {
        if self.last_signal_date == Some(today) {
            self.signals_today
        } else {
            0
        }
    }

    /// Full level breakdown for the current total.
    pub fn level_info(&self) -> LevelInfo {
        compute_level(self.total_signals)
    }

    /// Activity log, newest first, with legacy source types canonicalized.
    pub fn normalized_events(&self) -> Vec<SignalEvent> {
        self.signal_events.iter().map(SignalEvent::normalized).collect()
    }

    fn roll_day(&mut self, today: NaiveDate) {
        match self.last_signal_date {
            Some(last) if last == today => {
                if self.streak_days == 0 {
                    self.streak_days = 1;
                }
            }
            Some(last) if (today - last).num_days() == 1 => {
                self.streak_days += 1;
                self.signals_today = 0;
                self.last_signal_date = Some(today);
                log::debug!("date={today} streak extended to {}", self.streak_days);
            }
            previous => {
                if previous.is_some() && self.streak_days > 1 {
                    log::debug!("date={today} streak of {} broken", self.streak_days);
                }
                self.streak_days = 1;
                self.signals_today = 0;
                self.last_signal_date = Some(today);
            }
        }
    }

    fn refresh_level(&mut self) {
        let info = compute_level(self.total_signals);
        if info.level > self.level {
            log::info!("level up: {} -> {} ({})", self.level, info.level, info.title);
        }
        self.level = info.level;
        self.level_title = info.title;
        self.next_level_at = info.next_threshold;
        self.progress_percent = info.progress_percent;
    }
}

fn apply_floored(total: u64, delta: i64) -> u64 {
    if delta >= 0 {
        total.saturating_add(delta.unsigned_abs())
    } else {
        let magnitude = delta.unsigned_abs();
        if magnitude > total {
            log::warn!("delta={delta} would take total {total} below zero, flooring");
        }
        total.saturating_sub(magnitude)
    }
}
