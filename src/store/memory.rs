//! Process-local record store

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::Result;
use crate::store::traits::{GenerationRecord, NewGenerationRecord, RecordStore};

struct Inner {
    next_id: i64,
    records: Vec<GenerationRecord>,
}

/// Non-durable store keeping records in memory
pub struct InMemoryRecordStore {
    inner: RwLock<Inner>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                records: Vec::new(),
            }),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert(&self, record: NewGenerationRecord) -> Result<GenerationRecord> {
        let mut inner = self.inner.write();
        let stored = GenerationRecord {
            id: inner.next_id,
            url: record.url,
            prompt: record.prompt,
            created_at: record.created_at,
        };
        inner.next_id += 1;
        inner.records.push(stored.clone());
        Ok(stored)
    }

    async fn list_recent(&self) -> Result<Vec<GenerationRecord>> {
        let mut records = self.inner.read().records.clone();
        // Ties on created_at fall back to insertion order, newest first
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }
}
