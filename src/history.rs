use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};
use tracing::info;

use crate::error::{Result, TrackerError};
use crate::util::mean;
use crate::workout::{RepCounts, WorkoutConfig};

/// Identifier of a finished workout, derived from its completion time in ms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of a finished workout
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedWorkoutRecord {
    pub id: RecordId,
    pub completed_at: DateTime<Local>,
    pub total_elapsed_secs: u64,
    pub config: WorkoutConfig,
    pub completed_reps: RepCounts,
}

/// Aggregate figures shown above the history list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySummary {
    pub count: usize,
    pub fastest_secs: Option<u64>,
    pub average_secs: Option<f64>,
}

/// In-memory list of finished workouts, most recent first
#[derive(Debug, Default)]
pub struct HistoryStore {
    records: VecDeque<CompletedWorkoutRecord>,
    last_id: Option<u64>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids follow completion time but stay strictly increasing even when two
    /// workouts finish within the same millisecond.
    pub fn next_id(&mut self, at: DateTime<Local>) -> RecordId {
        let millis = at.timestamp_millis().max(0) as u64;
        let id = match self.last_id {
            Some(last) if millis <= last => last + 1,
            _ => millis,
        };
        self.last_id = Some(id);
        RecordId(id)
    }

    pub fn append(&mut self, record: CompletedWorkoutRecord) {
        self.last_id = Some(self.last_id.map_or(record.id.0, |l| l.max(record.id.0)));
        info!(id = %record.id, elapsed = record.total_elapsed_secs, "workout saved");
        self.records.push_front(record);
    }

    /// Removes the record with `id`, keeping the order of the rest
    pub fn delete(&mut self, id: RecordId) -> Result<CompletedWorkoutRecord> {
        let idx = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(TrackerError::NotFound(id))?;
        let removed = self.records.remove(idx).ok_or(TrackerError::NotFound(id))?;
        info!(%id, "workout deleted");
        Ok(removed)
    }

    pub fn list(&self) -> impl ExactSizeIterator<Item = &CompletedWorkoutRecord> {
        self.records.iter()
    }

    pub fn get(&self, index: usize) -> Option<&CompletedWorkoutRecord> {
        self.records.get(index)
    }

    pub fn find(&self, id: RecordId) -> Option<&CompletedWorkoutRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> HistorySummary {
        let times: Vec<f64> = self
            .records
            .iter()
            .map(|r| r.total_elapsed_secs as f64)
            .collect();

        HistorySummary {
            count: self.records.len(),
            fastest_secs: self.records.iter().map(|r| r.total_elapsed_secs).min(),
            average_secs: mean(&times),
        }
    }
}
