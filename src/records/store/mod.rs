//! Record store backends
//!
//! The store is built once at startup from `[database]` configuration and
//! shared by every request through `AppState`.

mod memory;
mod postgres;

use async_trait::async_trait;
use std::sync::Arc;

pub use memory::MemoryRecordStore;
pub use postgres::PostgresRecordStore;

use super::error::StoreError;
use super::model::{Record, RecordFilter};
use crate::config::{DatabaseBackend, DatabaseConfig};

/// Backing store for records
///
/// Implementations must be safe to call from concurrent requests.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Records matching the filter, ordered by creation time then key
    async fn find_records(&self, filter: &RecordFilter) -> Result<Vec<Record>, StoreError>;

    /// Every record in the store, same ordering as `find_records`
    async fn all_records(&self) -> Result<Vec<Record>, StoreError>;

    /// Connectivity check run once at startup
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Build the configured backend and verify it answers
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
    let store: Arc<dyn RecordStore> = match config.backend {
        DatabaseBackend::Postgres => {
            let url = config.url.as_deref().ok_or(StoreError::MissingUrl)?;
            Arc::new(PostgresRecordStore::connect(url, config.max_connections).await?)
        }
        DatabaseBackend::Memory => match config.seed_file.as_deref() {
            Some(path) => Arc::new(MemoryRecordStore::from_seed_file(path)?),
            None => Arc::new(MemoryRecordStore::new(Vec::new())),
        },
    };

    store.ping().await?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database_config(backend: DatabaseBackend) -> DatabaseConfig {
        DatabaseConfig {
            backend,
            url: None,
            max_connections: 1,
            seed_file: None,
        }
    }

    #[tokio::test]
    async fn test_connect_memory_without_seed() {
        let store = connect(&database_config(DatabaseBackend::Memory)).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert!(store.all_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connect_postgres_requires_url() {
        let result = connect(&database_config(DatabaseBackend::Postgres)).await;
        assert!(matches!(result, Err(StoreError::MissingUrl)));
    }

    #[tokio::test]
    async fn test_connect_memory_missing_seed_file() {
        let mut config = database_config(DatabaseBackend::Memory);
        config.seed_file = Some("/nonexistent/records-seed.json".to_string());
        let result = connect(&config).await;
        assert!(matches!(result, Err(StoreError::SeedIo { .. })));
    }
}
