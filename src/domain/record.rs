use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Wall-clock format used for every timestamp written to an artifact.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub title: String,
    pub url: String,
    pub source: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_time_format"
    )]
    pub time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NewsRecord {
    pub fn new(title: String, url: String, source: String) -> Self {
        Self {
            title,
            url,
            source,
            time: None,
            content: None,
        }
    }

    pub fn with_time(mut self, time: Option<NaiveDateTime>) -> Self {
        self.time = time;
        self
    }

    pub fn with_content(mut self, content: Option<String>) -> Self {
        self.content = content;
        self
    }

    /// Records with an unknown time always pass the cutoff.
    pub fn is_after(&self, cutoff: NaiveDateTime) -> bool {
        self.time.map_or(true, |time| time > cutoff)
    }

    pub fn formatted_time(&self) -> Option<String> {
        self.time.map(|t| t.format(TIME_FORMAT).to_string())
    }
}

pub(crate) mod time_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIME_FORMAT;

    pub fn serialize<S>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

pub(crate) mod optional_time_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIME_FORMAT;

    pub fn serialize<S>(time: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format(TIME_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => NaiveDateTime::parse_from_str(s, TIME_FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
