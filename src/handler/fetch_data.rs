//! Fetch-data handler
//!
//! Decodes a `RecordsRequestPayload`, validates its dates, queries the record
//! store and answers with a `RecordsResponsePayload`. Every outcome is HTTP 200;
//! failures are reported through the body's `code` and `message`.

use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Response, StatusCode};

use crate::http;
use crate::logger;
use crate::records::{
    Record, RecordFilter, RecordStore, RecordsRequestPayload, RecordsResponsePayload, RequestError,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub async fn handle_fetch_data<B>(
    body: B,
    store: &dyn RecordStore,
    max_body_size: u64,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let payload = match fetch_records(body, store, max_body_size).await {
        Ok(records) => RecordsResponsePayload::success(records),
        Err(err) => {
            log_request_error(&err);
            RecordsResponsePayload::from_error(&err)
        }
    };

    http::build_json_response(StatusCode::OK, &payload)
}

async fn fetch_records<B>(
    body: B,
    store: &dyn RecordStore,
    max_body_size: u64,
) -> Result<Vec<Record>, RequestError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let bytes = read_body(body, max_body_size).await?;
    let payload = decode_payload(&bytes)?;
    let filter = RecordFilter::from_payload(&payload)?;
    Ok(store.find_records(&filter).await?)
}

/// Collect the body, failing past `max_body_size` bytes
async fn read_body<B>(body: B, max_body_size: u64) -> Result<Bytes, RequestError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    Limited::new(body, limit)
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| RequestError::Decode(format!("failed to read body: {e}")))
}

fn decode_payload(bytes: &[u8]) -> Result<RecordsRequestPayload, RequestError> {
    serde_json::from_slice(bytes).map_err(|e| RequestError::Decode(e.to_string()))
}

pub fn log_request_error(err: &RequestError) {
    match err {
        RequestError::Store(_) => {
            logger::log_error(&format!("{}: {}", err.to_string().trim_end(), err.detail()));
        }
        RequestError::Decode(_) | RequestError::DateFormat(_) => {
            logger::log_warning(&format!("{}: {}", err.to_string().trim_end(), err.detail()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::store::MemoryRecordStore;
    use crate::records::StoreError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    const MAX_BODY: u64 = 1024;

    fn sample_record() -> Record {
        Record {
            key: "aCnXSuEJ".to_string(),
            created_at: Utc.with_ymd_and_hms(2015, 1, 19, 14, 27, 54).unwrap()
                + chrono::Duration::milliseconds(10),
            total_count: 3007,
        }
    }

    /// Returns a fixed result and remembers the filter it was asked for
    struct FixedStore {
        records: Vec<Record>,
        last_filter: Mutex<Option<RecordFilter>>,
    }

    impl FixedStore {
        fn new(records: Vec<Record>) -> Self {
            Self {
                records,
                last_filter: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl RecordStore for FixedStore {
        async fn find_records(&self, filter: &RecordFilter) -> Result<Vec<Record>, StoreError> {
            *self.last_filter.lock().unwrap() = Some(*filter);
            Ok(self.records.clone())
        }

        async fn all_records(&self) -> Result<Vec<Record>, StoreError> {
            Ok(self.records.clone())
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "fixed"
        }
    }

    struct FailingStore;

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn find_records(&self, _filter: &RecordFilter) -> Result<Vec<Record>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn all_records(&self) -> Result<Vec<Record>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    async fn call(body: &str, store: &dyn RecordStore) -> (StatusCode, String) {
        let response = handle_fetch_data(Full::new(Bytes::from(body.to_string())), store, MAX_BODY).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_success_result() {
        let store = FixedStore::new(vec![sample_record()]);
        let (status, body) = call(
            r#"{"startDate":"2015-01-26","endDate":"2016-02-01","minCount":3000,"maxCount":3010}"#,
            &store,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            concat!(r#"{"code":0,"message":"Succsess","records":[{"key":"aCnXSuEJ","createdAt":"2015-01-19T14:27:54.01Z","totalCount":3007}]}"#, "\n")
        );

        let filter = store.last_filter.lock().unwrap().unwrap();
        assert_eq!(filter.start, Utc.with_ymd_and_hms(2015, 1, 26, 0, 0, 0).unwrap());
        assert_eq!(filter.end, Utc.with_ymd_and_hms(2016, 2, 1, 0, 0, 0).unwrap());
        assert_eq!((filter.min_count, filter.max_count), (3000, 3010));
    }

    #[tokio::test]
    async fn test_could_not_complete_unmarshal_body() {
        let store = FixedStore::new(vec![sample_record()]);
        let (status, body) = call(
            r#"{"startDate":"2016-01-26","endDate":"2018-02-02","minCount":2700,"maxCount":"3000"}"#,
            &store,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            concat!(r#"{"code":2,"message":"Error: could not complete unmarshal body","records":[]}"#, "\n")
        );
        assert!(store.last_filter.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_and_empty_bodies() {
        let store = FixedStore::new(vec![sample_record()]);
        for body in ["", "{", "[1,2]", r#"{"minCount":1.5}"#] {
            let (_, response) = call(body, &store).await;
            assert!(response.starts_with(r#"{"code":2,"#), "body {body:?} gave {response}");
        }
    }

    #[tokio::test]
    async fn test_wrong_time_format() {
        let store = FixedStore::new(vec![sample_record()]);
        let (status, body) = call(
            r#"{"startDate":"2016-01-26","endDate":"2018-2-02","minCount":2700,"maxCount":3000}"#,
            &store,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            concat!(r#"{"code":3,"message":"Error: wrong time format ","records":[]}"#, "\n")
        );
    }

    #[tokio::test]
    async fn test_null_count_is_zero() {
        let store = FixedStore::new(Vec::new());
        let (_, body) = call(
            r#"{"startDate":"2015-01-26","endDate":"2016-02-01","minCount":null,"maxCount":3010}"#,
            &store,
        )
        .await;

        assert_eq!(body, concat!(r#"{"code":0,"message":"Succsess","records":[]}"#, "\n"));
        let filter = store.last_filter.lock().unwrap().unwrap();
        assert_eq!((filter.min_count, filter.max_count), (0, 3010));
    }

    #[tokio::test]
    async fn test_missing_dates_are_wrong_time_format() {
        let store = FixedStore::new(vec![sample_record()]);
        let (_, body) = call(r#"{"minCount":1,"maxCount":2}"#, &store).await;
        assert!(body.starts_with(r#"{"code":3,"#));
    }

    #[tokio::test]
    async fn test_store_failure_is_code_1() {
        let (status, body) = call(
            r#"{"startDate":"2015-01-26","endDate":"2016-02-01","minCount":3000,"maxCount":3010}"#,
            &FailingStore,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            concat!(r#"{"code":1,"message":"Error: could not fetch records","records":[]}"#, "\n")
        );
    }

    #[tokio::test]
    async fn test_body_over_limit_is_decode_error() {
        let store = FixedStore::new(Vec::new());
        let padding = " ".repeat(2048);
        let (_, body) = call(
            &format!(r#"{{"startDate":"2015-01-26","endDate":"2016-02-01"{padding}}}"#),
            &store,
        )
        .await;
        assert!(body.starts_with(r#"{"code":2,"#));
    }

    #[tokio::test]
    async fn test_repeated_request_is_byte_identical() {
        let store = MemoryRecordStore::new(vec![
            sample_record(),
            Record {
                key: "other".to_string(),
                created_at: Utc.with_ymd_and_hms(2015, 6, 1, 12, 0, 0).unwrap(),
                total_count: 3001,
            },
        ]);
        let request = r#"{"startDate":"2015-01-01","endDate":"2016-01-01","minCount":3000,"maxCount":3010}"#;

        let (_, first) = call(request, &store).await;
        let (_, second) = call(request, &store).await;
        assert_eq!(first, second);
        assert!(first.contains(r#""key":"aCnXSuEJ""#));
        assert!(first.contains(r#""key":"other""#));
    }
}
