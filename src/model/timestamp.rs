use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub fn now() -> Timestamp {
    Timestamp(Utc::now())
}

/// A UTC instant stored as an RFC 3339 string, so it survives both JSON and the database untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.to_rfc3339().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| Self(dt.into()))
            .map_err(serde::de::Error::custom)
    }
}
