// Application state module
// Shared, read-only state handed to every connection

use std::sync::Arc;

use super::types::Config;
use crate::logger::AccessLogFormat;
use crate::records::RecordStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    // Parsed once instead of per request
    pub access_log_format: AccessLogFormat,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn RecordStore>) -> Self {
        let access_log_format = AccessLogFormat::parse(&config.logging.access_log_format);
        Self {
            config,
            store,
            access_log_format,
        }
    }
}
