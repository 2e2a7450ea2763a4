//! Level calculation — cumulative signal count to level, title and progress.
//!
//! The table is strictly increasing by `min_signals`. Weight and title sit
//! in the same row as the threshold so the three can never drift apart.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelDefinition {
    pub level:       u32,
    pub min_signals: u64,
    pub weight:      f64,
    pub title:       &'static str,
}

pub const LEVELS: [LevelDefinition; 4] = [
    LevelDefinition { level: 1, min_signals: 0,  weight: 1.0, title: "Observer" },
    LevelDefinition { level: 2, min_signals: 10, weight: 1.2, title: "Participant" },
    LevelDefinition { level: 3, min_signals: 25, weight: 1.5, title: "Voice" },
    LevelDefinition { level: 4, min_signals: 50, weight: 2.0, title: "Opinion Leader" },
];

/// Synthetic span past the final threshold. Keeps `next_threshold`
/// strictly greater than `current_threshold` at the top level.
pub const FINAL_LEVEL_SPAN: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub level:             u32,
    pub title:             String,
    pub current_threshold: u64,
    pub next_threshold:    u64,
    pub progress_percent:  u8,
    pub weight:            f64,
}

impl LevelInfo {
    pub fn is_final(&self) -> bool {
        self.level as usize == LEVELS.len()
    }
}

fn level_index(total_signals: u64) -> usize {
    LEVELS
        .iter()
        .rposition(|l| total_signals >= l.min_signals)
        .unwrap_or(0)
}

pub fn compute_level(total_signals: u64) -> LevelInfo {
    let idx = level_index(total_signals);
    let def = &LEVELS[idx];
    let current = def.min_signals;

    let (next, progress_percent) = match LEVELS.get(idx + 1) {
        Some(next) => {
            let span = (next.min_signals - current) as f64;
            let done = (total_signals - current) as f64;
            let pct = (done / span * 100.0).clamp(0.0, 100.0).round() as u8;
            (next.min_signals, pct)
        }
        None => (current + FINAL_LEVEL_SPAN, 100),
    };

    LevelInfo {
        level: def.level,
        title: def.title.to_string(),
        current_threshold: current,
        next_threshold: next,
        progress_percent,
        weight: def.weight,
    }
}

/// The next level row above `total_signals`, if any.
pub fn next_level(total_signals: u64) -> Option<&'static LevelDefinition> {
    LEVELS.get(level_index(total_signals) + 1)
}

/// Influence multiplier for a level. Out-of-range levels clamp to the table.
pub fn signal_weight(level: u32) -> f64 {
    let idx = (level.max(1) as usize - 1).min(LEVELS.len() - 1);
    LEVELS[idx].weight
}
