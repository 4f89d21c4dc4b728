use crate::domain::errors::BackendError;
use crate::ports::outbound::RecordBackend;
use std::collections::HashMap;

/// In-memory record backend for unit tests and ephemeral runs.
///
/// Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryRecordBackend {
    records: HashMap<String, Vec<u8>>,
}

impl InMemoryRecordBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordBackend for InMemoryRecordBackend {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.records.get(key).cloned())
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<(), BackendError> {
        self.records.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, BackendError> {
        Ok(self.records.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.records.keys().cloned().collect())
    }

    fn contains(&self, key: &str) -> Result<bool, BackendError> {
        Ok(self.records.contains_key(key))
    }
}
