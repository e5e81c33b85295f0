// In-memory record store
// Holds a fixed record set, optionally loaded from a JSON seed file

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::RecordStore;
use crate::records::error::StoreError;
use crate::records::model::{Record, RecordFilter};

/// Seed file entry
///
/// Either `totalCount` or a `counts` array (summed) may be given.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedRecord {
    key: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    total_count: Option<i64>,
    #[serde(default)]
    counts: Vec<i64>,
}

impl From<SeedRecord> for Record {
    fn from(seed: SeedRecord) -> Self {
        let total_count = seed.total_count.unwrap_or_else(|| seed.counts.iter().sum());
        Self {
            key: seed.key,
            created_at: seed.created_at,
            total_count,
        }
    }
}

pub struct MemoryRecordStore {
    records: Vec<Record>,
}

impl MemoryRecordStore {
    pub fn new(mut records: Vec<Record>) -> Self {
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.key.cmp(&b.key)));
        Self { records }
    }

    pub fn from_seed_file(path: &str) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::SeedIo {
            path: path.to_string(),
            source,
        })?;
        Self::from_seed_json(&content).map_err(|source| StoreError::SeedParse {
            path: path.to_string(),
            source,
        })
    }

    fn from_seed_json(content: &str) -> Result<Self, serde_json::Error> {
        let seeds: Vec<SeedRecord> = serde_json::from_str(content)?;
        Ok(Self::new(seeds.into_iter().map(Record::from).collect()))
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_records(&self, filter: &RecordFilter) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn all_records(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self.records.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
