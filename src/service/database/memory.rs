use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::*;

/// An in-process store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<DashMap<WatchKey, WatchRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ProgressStore for MemoryStore {
    async fn find(&self, key: &WatchKey) -> Result<Option<WatchRecord>> {
        Ok(self.records.get(key).map(|record| record.value().clone()))
    }

    async fn create(&self, record: &WatchRecord) -> Result<WatchRecord> {
        match self.records.entry(record.key()) {
            Entry::Occupied(entry) => ConflictSnafu {
                key: entry.key().clone(),
                expected: None::<u64>,
            }
            .fail(),
            Entry::Vacant(entry) => Ok(entry.insert(record.clone()).value().clone()),
        }
    }

    async fn update(&self, record: &WatchRecord) -> Result<WatchRecord> {
        let key = record.key();
        let mut stored = self.records.get_mut(&key).context(ConflictSnafu {
            key: key.clone(),
            expected: Some(record.version),
        })?;

        ensure!(
            stored.version == record.version,
            ConflictSnafu {
                key,
                expected: Some(record.version),
            }
        );

        *stored = WatchRecord {
            version: record.version + 1,
            ..record.clone()
        };

        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Interval, PositionPolicy, UserId};

    fn key() -> WatchKey {
        WatchKey::new(UserId::new("grace".into()), "compilers-101".parse().unwrap())
    }

    #[tokio::test]
    async fn create_then_find() {
        let store = MemoryStore::new();
        let record = WatchRecord::first(&key(), Interval::new(0.0, 30.0), 60.0);

        store.create(&record).await.unwrap();

        assert_eq!(store.find(&key()).await.unwrap(), Some(record));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_create_is_a_conflict() {
        let store = MemoryStore::new();
        let record = WatchRecord::first(&key(), Interval::new(0.0, 30.0), 60.0);

        store.create(&record).await.unwrap();
        let err = store.create(&record).await.unwrap_err();

        assert!(err.is_conflict(), "{err}");
    }

    #[tokio::test]
    async fn update_bumps_the_version() {
        let store = MemoryStore::new();
        let mut record = store
            .create(&WatchRecord::first(&key(), Interval::new(0.0, 30.0), 60.0))
            .await
            .unwrap();

        record.record_interval(Interval::new(30.0, 60.0), PositionPolicy::LastWrite);
        let updated = store.update(&record).await.unwrap();

        assert_eq!(updated.version, 2);
        assert_eq!(updated.total_progress, 100.0);
        assert_eq!(store.find(&key()).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn stale_update_is_a_conflict() {
        let store = MemoryStore::new();
        let original = store
            .create(&WatchRecord::first(&key(), Interval::new(0.0, 30.0), 60.0))
            .await
            .unwrap();

        let mut first = original.clone();
        first.record_interval(Interval::new(40.0, 50.0), PositionPolicy::LastWrite);
        store.update(&first).await.unwrap();

        let mut second = original;
        second.record_interval(Interval::new(55.0, 60.0), PositionPolicy::LastWrite);
        let err = store.update(&second).await.unwrap_err();

        assert!(err.is_conflict(), "{err}");
        let stored = store.find(&key()).await.unwrap().unwrap();
        assert_eq!(
            stored.watched_intervals,
            vec![Interval::new(0.0, 30.0), Interval::new(40.0, 50.0)],
            "the rejected write must not be applied"
        );
    }

    #[tokio::test]
    async fn update_of_missing_record_is_a_conflict() {
        let store = MemoryStore::new();
        let record = WatchRecord::first(&key(), Interval::new(0.0, 30.0), 60.0);

        assert!(store.update(&record).await.unwrap_err().is_conflict());
        assert!(store.is_empty());
    }
}
