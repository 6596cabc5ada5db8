//! `HH:MM` (de)serialization for times of day.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%H:%M";

pub fn serialize<S>(time: &NaiveTime, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format(FORMAT).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = String::deserialize(deserializer)?;
    parse(&value).ok_or_else(|| D::Error::custom(format!("invalid time of day '{}'", value)))
}

/// Parse `HH:MM`, also accepting `HH:MM:SS`.
pub fn parse(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

pub fn format(time: &NaiveTime) -> String {
    time.format(FORMAT).to_string()
}
