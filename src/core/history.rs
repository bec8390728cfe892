//! Record of committed transitions.
//!
//! Every transition that commits is appended here with its timestamp. The
//! history is bounded: once the limit is reached the oldest record is
//! dropped.

use super::id::{EventId, StateId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Default number of records kept per machine.
pub const DEFAULT_HISTORY_LIMIT: usize = 128;

/// Record of a single committed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state being left
    pub from: StateId,
    /// The event that triggered the transition
    pub event: EventId,
    /// The state entered
    pub to: StateId,
    /// When the state change committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of transitions.
///
/// # Example
///
/// ```rust
/// use fluxstate::core::{TransitionHistory, TransitionRecord};
/// use fluxstate::{EventId, StateId};
/// use chrono::Utc;
///
/// let mut history = TransitionHistory::with_limit(Some(8));
///
/// history.record(TransitionRecord {
///     from: StateId::new(0),
///     event: EventId::new(1),
///     to: StateId::new(1),
///     timestamp: Utc::now(),
/// });
/// history.record(TransitionRecord {
///     from: StateId::new(1),
///     event: EventId::new(2),
///     to: StateId::new(2),
///     timestamp: Utc::now(),
/// });
///
/// let path = history.path();
/// assert_eq!(path, vec![StateId::new(0), StateId::new(1), StateId::new(2)]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionHistory {
    records: VecDeque<TransitionRecord>,
    limit: Option<usize>,
}

impl Default for TransitionHistory {
    fn default() -> Self {
        Self::with_limit(Some(DEFAULT_HISTORY_LIMIT))
    }
}

impl TransitionHistory {
    /// Create a history keeping at most `limit` records (`None` = unbounded).
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            records: VecDeque::new(),
            limit,
        }
    }

    /// Append a record, evicting the oldest one if the limit is reached.
    pub fn record(&mut self, record: TransitionRecord) {
        if self.limit == Some(0) {
            return;
        }
        if let Some(limit) = self.limit {
            while self.records.len() >= limit {
                self.records.pop_front();
            }
        }
        self.records.push_back(record);
    }

    /// States traversed: the source of the oldest kept record, then the
    /// target of every record.
    pub fn path(&self) -> Vec<StateId> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from);
        }
        path.extend(self.records.iter().map(|r| r.to));
        path
    }

    /// Time between the oldest and newest kept records.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord> + '_ {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
