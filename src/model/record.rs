use super::*;

/// Identity of a [WatchRecord]. There is at most one record per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct WatchKey {
    pub user_id: UserId,
    pub video_id: VideoId,
}

impl std::fmt::Display for WatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user_id, self.video_id)
    }
}

/// How `lastPosition` reacts to a newly reported interval.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionPolicy {
    /// Resume from wherever the most recent report ended, even if that moves backwards.
    #[default]
    LastWrite,
    /// Keep the furthest point ever reached.
    Furthest,
}

impl PositionPolicy {
    pub fn next_position(self, current: f64, reported: &Interval) -> f64 {
        match self {
            PositionPolicy::LastWrite => reported.end,
            PositionPolicy::Furthest => current.max(reported.end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct WatchRecord {
    pub user_id: UserId,
    pub video_id: VideoId,
    pub video_duration: f64,

    #[new(default)]
    pub watched_intervals: Vec<Interval>,
    #[new(default)]
    pub total_progress: f64,
    #[new(default)]
    pub last_position: f64,

    #[new(value = "1")]
    pub version: u64,
    #[new(value = "now()")]
    pub created_at: Timestamp,
    #[new(value = "now()")]
    pub updated_at: Timestamp,
}

impl WatchRecord {
    /// Builds the record for the first interval ever reported on `key`.
    pub fn first(key: &WatchKey, interval: Interval, video_duration: f64) -> Self {
        let mut record = Self::new(key.user_id.clone(), key.video_id.clone(), video_duration);
        record.watched_intervals = vec![interval];
        record.last_position = interval.end;
        record.total_progress = compute_progress(&record.watched_intervals, video_duration);
        record
    }

    pub fn key(&self) -> WatchKey {
        WatchKey::new(self.user_id.clone(), self.video_id.clone())
    }

    /// Folds a newly reported interval into the record, keeping the interval set merged and the
    /// progress in sync with it. The duration stored at creation stays the denominator.
    pub fn record_interval(&mut self, interval: Interval, policy: PositionPolicy) {
        self.watched_intervals.push(interval);
        self.last_position = policy.next_position(self.last_position, &interval);
        self.watched_intervals = merge(&self.watched_intervals);
        self.total_progress = compute_progress(&self.watched_intervals, self.video_duration);
        self.updated_at = now();
    }
}

/// What a client sees for a video: the stored record, or an empty placeholder when nothing has
/// been reported yet. The placeholder carries no duration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ProgressView {
    Recorded(WatchRecord),
    Empty(EmptyProgress),
}

impl From<Option<WatchRecord>> for ProgressView {
    fn from(record: Option<WatchRecord>) -> Self {
        match record {
            Some(record) => ProgressView::Recorded(record),
            None => ProgressView::Empty(EmptyProgress::default()),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyProgress {
    pub watched_intervals: Vec<Interval>,
    pub total_progress: f64,
    pub last_position: f64,
}
