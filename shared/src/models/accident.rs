//! Accident record models

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{GpsCoordinates, RecordId};

/// Severity category of an accident
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Dangerous,
    Major,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Dangerous => "dangerous",
            Severity::Major => "major",
            Severity::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A geolocated accident record, scoped to a single request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AccidentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[serde(
        rename = "accident_time",
        alias = "timestamp",
        default,
        with = "flexible_timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<NaiveDateTime>,

    #[serde(default)]
    pub severity: Severity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AccidentRecord {
    pub fn new(latitude: f64, longitude: f64, severity: Severity) -> Self {
        Self {
            id: None,
            latitude,
            longitude,
            timestamp: None,
            severity,
            description: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn coordinates(&self) -> GpsCoordinates {
        GpsCoordinates::new(self.latitude, self.longitude)
    }

    pub fn is_dangerous(&self) -> bool {
        self.severity == Severity::Dangerous
    }

    /// Hour of day the accident happened, if timed
    pub fn hour(&self) -> Option<u32> {
        self.timestamp.map(|ts| ts.hour())
    }
}

/// Only the time of an accident, for time-series inputs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AccidentTime {
    #[serde(rename = "accident_time", alias = "timestamp", with = "flexible_timestamp")]
    pub timestamp: NaiveDateTime,
}

/// Lenient timestamp parsing for accident payloads
///
/// Accepts RFC 3339 (normalized to UTC), `YYYY-MM-DDTHH:MM[:SS[.f]]`,
/// `YYYY-MM-DD HH:MM[:SS[.f]]` and bare dates (midnight).
pub mod flexible_timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
            return Some(zoned.naive_utc());
        }
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(OUTPUT_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("unrecognized timestamp `{}`", raw)))
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(ts) => super::serialize(ts, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("unrecognized timestamp `{}`", raw))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();

        assert_eq!(flexible_timestamp::parse("2024-03-09T18:30:00"), Some(expected));
        assert_eq!(flexible_timestamp::parse("2024-03-09 18:30:00"), Some(expected));
        assert_eq!(flexible_timestamp::parse("2024-03-09T18:30"), Some(expected));
        assert_eq!(flexible_timestamp::parse("2024-03-09T18:30:00Z"), Some(expected));
        assert_eq!(flexible_timestamp::parse("2024-03-10T00:00:00+05:30"), Some(expected));
        assert_eq!(
            flexible_timestamp::parse("2024-03-09").map(|ts| ts.day()),
            Some(9)
        );
        assert_eq!(flexible_timestamp::parse("yesterday"), None);
    }

    #[test]
    fn test_record_deserialization() {
        let json = r#"{
            "id": 42,
            "latitude": 12.9716,
            "longitude": 77.5946,
            "accident_time": "2024-01-15 08:45:00",
            "severity": "dangerous",
            "description": "Two-wheeler skid near junction"
        }"#;
        let record: AccidentRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, Some(RecordId::Number(42)));
        assert_eq!(record.severity, Severity::Dangerous);
        assert_eq!(record.hour(), Some(8));
        assert!(record.is_dangerous());
    }

    #[test]
    fn test_record_defaults() {
        let record: AccidentRecord =
            serde_json::from_str(r#"{"latitude": 1.0, "longitude": 2.0}"#).unwrap();
        assert_eq!(record.severity, Severity::Unknown);
        assert!(record.timestamp.is_none());
        assert!(record.id.is_none());
    }

    #[test]
    fn test_unrecognized_severity_is_unknown() {
        let record: AccidentRecord = serde_json::from_str(
            r#"{"latitude": 1.0, "longitude": 2.0, "severity": "catastrophic"}"#,
        )
        .unwrap();
        assert_eq!(record.severity, Severity::Unknown);
    }

    #[test]
    fn test_timestamp_alias() {
        let time: AccidentTime =
            serde_json::from_str(r#"{"timestamp": "2024-05-01T06:00:00"}"#).unwrap();
        assert_eq!(time.timestamp.hour(), 6);
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let result: Result<AccidentRecord, _> = serde_json::from_str(
            r#"{"latitude": 1.0, "longitude": 2.0, "accident_time": "not a time"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_record_fails_validation() {
        let record = AccidentRecord::new(95.0, 10.0, Severity::Minor);
        assert!(record.validate().is_err());

        let record = AccidentRecord::new(45.0, 10.0, Severity::Minor);
        assert!(record.validate().is_ok());
    }
}
