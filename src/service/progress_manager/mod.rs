use derive_new::new;
use snafu::{Location, ResultExt, Snafu};
use tokio_retry::RetryIf;
use tracing::instrument;

use crate::config::RetryConfig;
use crate::model::{Interval, PositionPolicy, WatchKey, WatchRecord};
use crate::service::database::{DatabaseError, ProgressStore};
use crate::service::keyed_lock::KeyedLocks;
use crate::Located;

/// A newly watched interval as reported by a client, already validated.
#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct Report {
    pub interval: Interval,
    pub video_duration: f64,
}

/// Applies interval reports to stored [WatchRecord]s.
///
/// Reports for the same key are serialized in receipt order by a keyed lock, and each one runs as
/// a single read-merge-write cycle. If the store still detects a concurrent writer (another
/// process sharing the database), the whole cycle is retried with backoff.
#[derive(Debug, new)]
pub struct ProgressManager<S> {
    store: S,
    policy: PositionPolicy,
    retry: RetryConfig,
    #[new(default)]
    locks: KeyedLocks<WatchKey>,
}

impl<S: ProgressStore> ProgressManager<S> {
    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn progress(&self, key: &WatchKey) -> Result<Option<WatchRecord>, ProgressError> {
        self.store.find(key).await.context(ReadSnafu { key: key.clone() })
    }

    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn report(&self, key: WatchKey, report: Report) -> Result<WatchRecord, ProgressError> {
        let _guard = self.locks.lock(key.clone()).await;

        let record = RetryIf::spawn(
            self.retry.strategy(),
            || self.apply(&key, report),
            |err: &DatabaseError| {
                if err.is_conflict() {
                    tracing::warn!(key = %key, error = %err, "concurrent write detected, retrying");
                }
                err.is_conflict()
            },
        )
        .await
        .context(WriteSnafu { key: key.clone() })?;

        tracing::debug!(
            version = record.version,
            total_progress = record.total_progress,
            last_position = record.last_position,
            "recorded interval {:?} for `{}`",
            report.interval,
            key
        );

        Ok(record)
    }

    /// One read-merge-write cycle.
    async fn apply(&self, key: &WatchKey, report: Report) -> Result<WatchRecord, DatabaseError> {
        match self.store.find(key).await? {
            None => {
                let record = WatchRecord::first(key, report.interval, report.video_duration);
                self.store.create(&record).await
            }
            Some(mut record) => {
                if record.video_duration != report.video_duration {
                    tracing::debug!(
                        stored = record.video_duration,
                        reported = report.video_duration,
                        "ignoring reported duration, keeping the one stored at creation"
                    );
                }

                record.record_interval(report.interval, self.policy);
                self.store.update(&record).await
            }
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProgressError {
    #[snafu(display("failed to read progress for `{key}`: {source}"))]
    Read {
        key: WatchKey,
        source: DatabaseError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to record progress for `{key}`: {source}"))]
    Write {
        key: WatchKey,
        source: DatabaseError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Located for ProgressError {
    fn location(&self) -> Location {
        match self {
            ProgressError::Read { location, .. } | ProgressError::Write { location, .. } => {
                *location
            }
        }
    }
}
