//! Persistence and time collaborators.
//!
//! The engine performs no I/O of its own: history comes from a
//! [`RecordStore`] and "now" from a [`Clock`], both injected by the caller.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::AnalysisRecord;
use crate::error::Result;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A record together with the id the store assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub record: AnalysisRecord,
}

/// Append-only history of analysis records.
pub trait RecordStore: Send + Sync {
    /// Store a record and return its id.
    fn append(&self, record: AnalysisRecord) -> Result<Uuid>;

    /// The latest `limit` records in chronological order.
    fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Vec<StoredRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Uuid) -> Option<AnalysisRecord> {
        self.records
            .read()
            .iter()
            .find(|stored| stored.id == id)
            .map(|stored| stored.record.clone())
    }

    pub fn snapshot(&self) -> Vec<StoredRecord> {
        self.records.read().clone()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn append(&self, record: AnalysisRecord) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let mut records = self.records.write();
        // Keep chronological order even when records arrive late.
        let position = records.partition_point(|stored| stored.record.timestamp <= record.timestamp);
        records.insert(position, StoredRecord { id, record });
        Ok(id)
    }

    fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>> {
        let records = self.records.read();
        let start = records.len().saturating_sub(limit);
        Ok(records[start..]
            .iter()
            .map(|stored| stored.record.clone())
            .collect())
    }

    fn len(&self) -> usize {
        self.records.read().len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::label::EmotionLabel;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_recent_is_chronological() {
        let store = InMemoryRecordStore::new();
        store.append(AnalysisRecord::new(at(3), EmotionLabel::Joy, 0.9)).unwrap();
        store.append(AnalysisRecord::new(at(1), EmotionLabel::Fear, 0.4)).unwrap();
        store.append(AnalysisRecord::new(at(2), EmotionLabel::Love, 0.7)).unwrap();

        assert_eq!(store.len(), 3);
        let recent = store.recent(2).unwrap();
        let labels: Vec<_> = recent.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec![EmotionLabel::Love, EmotionLabel::Joy]);
        assert_eq!(store.recent(10).unwrap().len(), 3);
    }

    #[test]
    fn test_ids_are_unique() {
        let store = InMemoryRecordStore::new();
        let a = store.append(AnalysisRecord::new(at(1), EmotionLabel::Joy, 0.9)).unwrap();
        let b = store.append(AnalysisRecord::new(at(1), EmotionLabel::Joy, 0.9)).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.get(a).map(|r| r.label), Some(EmotionLabel::Joy));
        assert!(store.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(at(5));
        assert_eq!(clock.now(), at(5));
        assert!(SystemClock.now() > at(5));
    }
}
