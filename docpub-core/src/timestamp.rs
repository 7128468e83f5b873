//! Timestamp text form shared by the config file and the CMS wire format:
//! `yyyy-MM-dd'T'HH:mm:ss.SSSZ`, e.g. `2024-03-01T09:30:00.000+0000`.

use chrono::{DateTime, Utc};

/// chrono pattern for the persisted timestamp form.
pub const PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

pub fn format(value: &DateTime<Utc>) -> String {
    value.format(PATTERN).to_string()
}

/// Parse the persisted form, falling back to RFC 3339 (`...Z` / `...+00:00`).
pub fn parse(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_str(text, PATTERN) {
        Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
        Err(err) => DateTime::parse_from_rfc3339(text)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| err),
    }
}

/// `#[serde(with = "timestamp::option")]` for `Option<DateTime<Utc>>` fields.
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&super::format(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|text| super::parse(&text).map_err(serde::de::Error::custom))
            .transpose()
    }
}
