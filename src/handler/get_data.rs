//! Get-data handler: every record in the store, unfiltered

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::fetch_data::log_request_error;
use crate::http;
use crate::records::{RecordStore, RecordsResponsePayload, RequestError};

pub async fn handle_get_data(store: &dyn RecordStore) -> Response<Full<Bytes>> {
    let payload = match store.all_records().await {
        Ok(records) => RecordsResponsePayload::success(records),
        Err(err) => {
            let err = RequestError::from(err);
            log_request_error(&err);
            RecordsResponsePayload::from_error(&err)
        }
    };

    http::build_json_response(StatusCode::OK, &payload)
}
