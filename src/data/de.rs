//! Lenient deserializers for provider payloads
//!
//! The osu! v1 API sends every number as a JSON string, and both providers
//! use `null` freely. These helpers accept either representation.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    Text(String),
}

/// Deserializes a number that may be sent as a JSON number or a numeric string
pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match NumberOrString::<T>::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.trim().parse().map_err(D::Error::custom),
    }
}

/// Like [`number`], but `null`, a missing field or an empty string become `None`
pub fn optional_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<NumberOrString<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
    }
}

/// Deserializes a timestamp given either as RFC 3339 or as a naive ISO date-time (taken as UTC)
pub fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw:?}")))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "number")]
        id: u64,
        #[serde(default, deserialize_with = "optional_number")]
        pp: Option<f64>,
        #[serde(deserialize_with = "timestamp")]
        at: DateTime<Utc>,
    }

    #[test]
    fn test_number_accepts_string_and_number() {
        let a: Sample =
            serde_json::from_str(r#"{"id": "124493", "at": "2024-01-02T03:04:05Z"}"#).unwrap();
        let b: Sample =
            serde_json::from_str(r#"{"id": 124493, "at": "2024-01-02T03:04:05Z"}"#).unwrap();
        assert_eq!(a.id, 124493);
        assert_eq!(b.id, 124493);
    }

    #[test]
    fn test_number_rejects_garbage() {
        let result =
            serde_json::from_str::<Sample>(r#"{"id": "abc", "at": "2024-01-02T03:04:05Z"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_optional_number_variants() {
        let cases = [
            (r#""pp": "8123.45","#, Some(8123.45)),
            (r#""pp": 12.5,"#, Some(12.5)),
            (r#""pp": null,"#, None),
            (r#""pp": "","#, None),
            ("", None),
        ];
        for (field, expected) in cases {
            let json = format!(r#"{{"id": 1, {field} "at": "2024-01-02T03:04:05Z"}}"#);
            let sample: Sample = serde_json::from_str(&json).unwrap();
            assert_eq!(sample.pp, expected, "input: {json}");
        }
    }

    #[test]
    fn test_timestamp_formats() {
        let rfc = parse_timestamp("2023-10-13T15:45:23.000Z").unwrap();
        assert_eq!((rfc.year(), rfc.month(), rfc.day()), (2023, 10, 13));
        assert_eq!(rfc.hour(), 15);

        let offset = parse_timestamp("2023-10-13T17:45:23+02:00").unwrap();
        assert_eq!(offset, rfc);

        let naive = parse_timestamp("2023-10-13T15:45:23").unwrap();
        assert_eq!(naive, rfc);

        let spaced = parse_timestamp("2023-10-13 15:45:23").unwrap();
        assert_eq!(spaced, rfc);

        assert!(parse_timestamp("yesterday").is_none());
    }
}
