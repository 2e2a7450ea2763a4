//! Activity log entries.
//!
//! An entry is immutable once written. Its id and timestamp are assigned by
//! the ledger, and the rest comes from the caller's `EventDetail`.

use crate::{clock::Clock, types::EventId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSourceType {
    Versus,
    Review,
    /// Legacy spelling of `Versus`. Readable, never written.
    Battle,
}

impl SignalSourceType {
    pub fn normalized(self) -> Self {
        match self {
            Self::Battle => Self::Versus,
            other => other,
        }
    }
}

/// What the caller knows about the action that produced a signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetail {
    pub source_type: SignalSourceType,
    /// Id of the content acted on (versus id, review id, ...).
    pub source_id:   String,
    pub title:       String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_id:     Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind:         Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount:       Option<i64>,
}

impl EventDetail {
    pub fn new(
        source_type: SignalSourceType,
        source_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            source_type,
            source_id: source_id.into(),
            title: title.into(),
            choice_label: None,
            trend_id: None,
            kind: None,
            amount: None,
        }
    }

    pub fn with_choice(mut self, label: impl Into<String>) -> Self {
        self.choice_label = Some(label.into());
        self
    }

    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub id:         EventId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub detail:     EventDetail,
}

impl SignalEvent {
    /// Stamp a new entry. Legacy source types are written in canonical form.
    pub fn stamp(mut detail: EventDetail, clock: &dyn Clock) -> Self {
        detail.source_type = detail.source_type.normalized();
        Self {
            id: format!("evt_{}", uuid::Uuid::new_v4().simple()),
            created_at: clock.now(),
            detail,
        }
    }

    pub fn normalized(&self) -> Self {
        let mut e = self.clone();
        e.detail.source_type = e.detail.source_type.normalized();
        e
    }
}
