// Record data model
// Request/response payloads of the fetch-data endpoint and the record entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::date::parse_day_start;
use super::error::RequestError;

const SUCCESS_MESSAGE: &str = "Succsess";

/// Fetch-data request body
///
/// Missing or `null` fields take their zero value and unknown fields are
/// ignored, so a body without dates is reported as a date format error, not a
/// decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordsRequestPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub end_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub min_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub max_count: i64,
}

/// One record read from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub key: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    pub total_count: i64,
}

/// Fetch-data response body, always sent with HTTP 200
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordsResponsePayload {
    pub code: i32,
    pub message: String,
    pub records: Vec<Record>,
}

impl RecordsResponsePayload {
    pub fn success(records: Vec<Record>) -> Self {
        Self {
            code: 0,
            message: SUCCESS_MESSAGE.to_string(),
            records,
        }
    }

    pub fn from_error(err: &RequestError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            records: Vec::new(),
        }
    }
}

/// Validated query handed to a record store, all bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFilter {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub min_count: i64,
    pub max_count: i64,
}

impl RecordFilter {
    pub fn from_payload(payload: &RecordsRequestPayload) -> Result<Self, RequestError> {
        Ok(Self {
            start: parse_day_start(&payload.start_date)?,
            end: parse_day_start(&payload.end_date)?,
            min_count: payload.min_count,
            max_count: payload.max_count,
        })
    }

    pub fn matches(&self, record: &Record) -> bool {
        (self.start..=self.end).contains(&record.created_at)
            && (self.min_count..=self.max_count).contains(&record.total_count)
    }
}

/// RFC 3339 in UTC, fraction trimmed of trailing zeros and dropped when zero
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    let mut out = ts.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = ts.timestamp_subsec_nanos() % 1_000_000_000;
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out.push('Z');
    out
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(ts))
}
