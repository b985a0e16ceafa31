use super::{CacheEntry, CacheStore};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
pub struct MockCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    write_count: Arc<Mutex<usize>>,
    read_count: Arc<Mutex<usize>>,
}

impl MockCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            write_count: Arc::new(Mutex::new(0)),
            read_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_entry(self, key: &str, entry: CacheEntry) -> Self {
        self.entries.lock().unwrap().insert(key.to_string(), entry);
        self
    }

    pub fn get_entry(&self, key: &str) -> Option<CacheEntry> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn get_write_count(&self) -> usize {
        *self.write_count.lock().unwrap()
    }

    pub fn get_read_count(&self) -> usize {
        *self.read_count.lock().unwrap()
    }
}

impl Default for MockCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MockCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        *self.read_count.lock().unwrap() += 1;

        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        *self.write_count.lock().unwrap() += 1;

        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
