//! Generation records and the record store trait

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// A persisted generation, as returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Assigned by the store
    pub id: i64,
    pub url: String,
    pub prompt: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Accept RFC 3339 timestamps, and offset-less ones (Postgres `timestamp`
/// columns) read as UTC
fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// A record about to be inserted; the store assigns the id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGenerationRecord {
    pub url: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

impl NewGenerationRecord {
    /// Stamp a new record with the current time
    pub fn new(url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prompt: prompt.into(),
            created_at: Utc::now(),
        }
    }
}

/// Trait for generation history stores
///
/// Failures are reported as `AppError::Store` carrying the store's own
/// message; endpoints add their context.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Get the store name
    fn name(&self) -> &str;

    /// Insert one record and return it as stored
    async fn insert(&self, record: NewGenerationRecord) -> Result<GenerationRecord>;

    /// All records, newest `created_at` first
    async fn list_recent(&self) -> Result<Vec<GenerationRecord>>;
}
