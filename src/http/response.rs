//! HTTP response building module
//!
//! Builders for the JSON and status responses the service sends.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderValue;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Body of the health endpoints
#[derive(Debug, Serialize)]
struct HealthBody {
    ok: bool,
}

/// Body of the non-200 status responses
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    ok: bool,
    error: &'a str,
}

/// Build compact JSON response, newline terminated
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(mut j) => {
            j.push(b'\n');
            j
        }
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_500_response();
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build `{"ok":true}` health response
pub fn build_health_response() -> Response<Full<Bytes>> {
    build_json_response(StatusCode::OK, &HealthBody { ok: true })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> Response<Full<Bytes>> {
    let mut response = build_error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    if let Ok(value) = allow.parse::<HeaderValue>() {
        response.headers_mut().insert("Allow", value);
    }
    response
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(allow: &str, enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", allow);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", allow)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

fn build_error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    build_json_response(
        status,
        &ErrorBody {
            ok: false,
            error: message,
        },
    )
}

fn build_500_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from("{\"ok\":false,\"error\":\"Internal Server Error\"}\n")))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_response() {
        let response = build_health_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Type"], "application/json");
        assert_eq!(body_string(response).await, "{\"ok\":true}\n");
    }

    #[tokio::test]
    async fn test_404_response() {
        let response = build_404_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "{\"ok\":false,\"error\":\"Not Found\"}\n");
    }

    #[test]
    fn test_405_sets_allow() {
        let response = build_405_response("POST, OPTIONS");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["Allow"], "POST, OPTIONS");
    }

    #[test]
    fn test_options_cors_headers() {
        let response = build_options_response("POST, OPTIONS", true);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");

        let plain = build_options_response("POST, OPTIONS", false);
        assert!(plain.headers().get("Access-Control-Allow-Origin").is_none());
    }
}
