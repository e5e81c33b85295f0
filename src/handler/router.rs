//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for route matching,
//! opt-in method checks, and access logging.

use crate::config::AppState;
use crate::handler::{fetch_data, get_data};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const ANY_METHOD: &str = "GET, HEAD, POST, PUT, PATCH, DELETE, OPTIONS";
const POST_ONLY: &str = "POST, OPTIONS";

/// Known endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    /// `/` and `/api/health`
    Health,
    /// `/getData`
    GetData,
    /// `/api/v1/fetch-data`
    FetchData,
}

impl Route {
    fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" | "/api/health" => Some(Self::Health),
            "/getData" => Some(Self::GetData),
            "/api/v1/fetch-data" => Some(Self::FetchData),
            _ => None,
        }
    }

    const fn allowed_methods(self, strict_methods: bool) -> &'static str {
        match self {
            Self::FetchData if strict_methods => POST_ONLY,
            _ => ANY_METHOD,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let access_entry = state
        .config
        .logging
        .access_log
        .then(|| new_access_entry(&req, peer_addr));

    let mut response = route_request(req, &state).await;

    if let Ok(server_name) = state.config.http.server_name.parse::<HeaderValue>() {
        response.headers_mut().insert("Server", server_name);
    }

    if let Some(mut entry) = access_entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.access_log_format);
    }

    Ok(response)
}

/// Route request based on path and configuration
///
/// Every method reaches the handlers unless CORS or strict methods are
/// enabled, in which case OPTIONS is answered as a preflight.
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let http_config = &state.config.http;

    let Some(route) = Route::from_path(req.uri().path()) else {
        return http::build_404_response();
    };

    let allow = route.allowed_methods(http_config.strict_methods);
    let restricted = http_config.strict_methods && route == Route::FetchData;
    if req.method() == Method::OPTIONS && (http_config.enable_cors || restricted) {
        return http::build_options_response(allow, http_config.enable_cors);
    }

    match route {
        Route::Health => http::build_health_response(),
        Route::GetData => get_data::handle_get_data(state.store.as_ref()).await,
        Route::FetchData => {
            if restricted && req.method() != Method::POST {
                logger::log_warning(&format!("Method not allowed: {}", req.method()));
                return http::build_405_response(allow);
            }
            // Oversized bodies fail while reading and are reported in the payload
            fetch_data::handle_fetch_data(
                req.into_body(),
                state.store.as_ref(),
                http_config.max_body_size,
            )
            .await
        }
    }
}

fn new_access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
