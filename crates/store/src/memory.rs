//! In-memory throttle store for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::record::ThrottleRecord;
use crate::traits::ThrottleStore;

/// A `HashMap`-backed store; drop-in for [`crate::FileStore`] in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, ThrottleRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing the evaluator.
    pub fn seed(&self, trigger_id: impl Into<String>, record: ThrottleRecord) {
        self.records.lock().unwrap().insert(trigger_id.into(), record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl ThrottleStore for MemoryStore {
    async fn read(&self, trigger_id: &str) -> Option<ThrottleRecord> {
        self.records.lock().unwrap().get(trigger_id).cloned()
    }

    async fn write(&self, trigger_id: &str, record: &ThrottleRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(trigger_id.to_owned(), record.clone());
    }

    async fn clear(&self, trigger_id: &str) {
        self.records.lock().unwrap().remove(trigger_id);
    }
}
