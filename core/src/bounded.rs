//! Fixed-capacity collections backing the ledger's dedup set and activity log.
//!
//! Both evict in O(1) from a `VecDeque`. Capacity travels with the data so a
//! persisted ledger comes back with the same bounds it was saved with.

use crate::{event::SignalEvent, types::VoteId};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Insertion-ordered set of counted vote ids. Oldest id is evicted first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "VoteIdSetRepr", into = "VoteIdSetRepr")]
pub struct VoteIdSet {
    capacity: usize,
    order:    VecDeque<VoteId>,
    index:    HashSet<VoteId>,
}

#[derive(Serialize, Deserialize)]
struct VoteIdSetRepr {
    capacity: usize,
    ids:      Vec<VoteId>,
}

impl VoteIdSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order:    VecDeque::new(),
            index:    HashSet::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Insert `id`, evicting the oldest entries past capacity.
    /// Returns false if the id was already present.
    pub fn insert(&mut self, id: VoteId) -> bool {
        if self.index.contains(&id) {
            return false;
        }
        self.index.insert(id.clone());
        self.order.push_back(id);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.index.remove(&evicted);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &VoteId> {
        self.order.iter()
    }
}

impl PartialEq for VoteIdSet {
    fn eq(&self, other: &Self) -> bool {
        self.capacity == other.capacity && self.order == other.order
    }
}

impl Eq for VoteIdSet {}

impl From<VoteIdSetRepr> for VoteIdSet {
    fn from(repr: VoteIdSetRepr) -> Self {
        let mut set = VoteIdSet::with_capacity(repr.capacity);
        for id in repr.ids {
            set.insert(id);
        }
        set
    }
}

impl From<VoteIdSet> for VoteIdSetRepr {
    fn from(set: VoteIdSet) -> Self {
        Self {
            capacity: set.capacity,
            ids:      set.order.into_iter().collect(),
        }
    }
}

/// Newest-first activity log. Oldest entry is evicted first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EventLogRepr", into = "EventLogRepr")]
pub struct EventLog {
    capacity: usize,
    entries:  VecDeque<SignalEvent>,
}

#[derive(Serialize, Deserialize)]
struct EventLogRepr {
    capacity: usize,
    entries:  Vec<SignalEvent>,
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries:  VecDeque::new(),
        }
    }

    pub fn push_newest(&mut self, event: SignalEvent) {
        self.entries.push_front(event);
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &SignalEvent> {
        self.entries.iter()
    }

    pub fn newest(&self) -> Option<&SignalEvent> {
        self.entries.front()
    }
}

// Stored entries are newest first, so an over-full log keeps its head.
impl From<EventLogRepr> for EventLog {
    fn from(repr: EventLogRepr) -> Self {
        let mut log = EventLog::with_capacity(repr.capacity);
        log.entries = repr.entries.into_iter().take(log.capacity).collect();
        log
    }
}

impl From<EventLog> for EventLogRepr {
    fn from(log: EventLog) -> Self {
        Self {
            capacity: log.capacity,
            entries:  log.entries.into_iter().collect(),
        }
    }
}
