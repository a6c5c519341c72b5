use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One line of the append-only attendance log, as written by the scraper.
///
/// Every field is optional so a partially written or hand-edited line still
/// deserializes; validation happens in the normalizer. `status` is scrape
/// metadata (`ok`, `no_visitors`, `closed_no_data`, `error`) and plays no part
/// in aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl RawRecord {
    pub fn new(timestamp: impl Into<String>, count: i64) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            count: Some(count),
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// A validated attendance reading in the reference zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub timestamp: DateTime<Tz>,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_tolerates_status_and_missing_fields() {
        let rec: RawRecord =
            serde_json::from_str(r#"{"timestamp": "2025-10-13T10:05:00+02:00", "count": 10, "status": "ok"}"#)
                .unwrap();
        assert_eq!(rec.count, Some(10));
        assert_eq!(rec.status.as_deref(), Some("ok"));

        let partial: RawRecord = serde_json::from_str(r#"{"count": 3}"#).unwrap();
        assert!(partial.timestamp.is_none());

        let nulls: RawRecord = serde_json::from_str(r#"{"timestamp": null, "count": null}"#).unwrap();
        assert_eq!(nulls, RawRecord::default());
    }

    #[test]
    fn test_raw_record_builder() {
        let rec = RawRecord::new("2025-10-13T10:05:00", 4).with_status("no_visitors");
        assert_eq!(rec.timestamp.as_deref(), Some("2025-10-13T10:05:00"));
        let json = serde_json::to_string(&RawRecord::new("t", 1)).unwrap();
        assert!(!json.contains("status"));
    }
}
