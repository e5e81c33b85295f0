// Record error types
//
// `RequestError` carries the body-embedded status of the fetch-data endpoint.
// Its `Display` output is the exact message written to the response.

use thiserror::Error;

/// Errors raised by a record store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to read seed file '{path}': {source}")]
    SeedIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seed file '{path}': {source}")]
    SeedParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("database.url is required for the postgres backend")]
    MissingUrl,
}

/// Per-request failure, reported as a `code`/`message` pair with HTTP 200
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Error: could not fetch records")]
    Store(#[from] StoreError),
    #[error("Error: could not complete unmarshal body")]
    Decode(String),
    #[error("Error: wrong time format ")]
    DateFormat(String),
}

impl RequestError {
    /// Status code embedded in the response body
    pub const fn code(&self) -> i32 {
        match self {
            Self::Store(_) => 1,
            Self::Decode(_) => 2,
            Self::DateFormat(_) => 3,
        }
    }

    /// Detail for the error log, never sent to the client
    pub fn detail(&self) -> String {
        match self {
            Self::Store(err) => err.to_string(),
            Self::Decode(detail) => detail.clone(),
            Self::DateFormat(value) => format!("invalid date '{value}', expected YYYY-MM-DD"),
        }
    }
}
