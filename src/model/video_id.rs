use snafu::Snafu;

use super::*;

/// A non-blank video identifier. Surrounding whitespace is rejected rather than trimmed so that
/// `" abc"` and `"abc"` can never name the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl std::str::FromStr for VideoId {
    type Err = ParseVideoId;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        VideoId::try_from(input.to_string())
    }
}

impl TryFrom<String> for VideoId {
    type Error = ParseVideoId;

    fn try_from(input: String) -> Result<Self, Self::Error> {
        if input.is_empty() || input.trim() != input {
            return Err(ParseVideoId::new(input));
        }

        Ok(VideoId(input))
    }
}

impl From<VideoId> for String {
    fn from(value: VideoId) -> Self {
        value.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::convert::AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Snafu, new)]
#[snafu(display("invalid video id: `{}`", text))]
pub struct ParseVideoId {
    pub text: String,
}

/// Identity of the caller, resolved upstream and trusted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
#[serde(transparent)]
pub struct UserId(String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::convert::AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
