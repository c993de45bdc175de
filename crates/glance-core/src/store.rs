use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Reserved key marking that some dictionary has been ingested.
/// Owned by the caller; the ingestor never reads or writes it.
pub const LOADED_FLAG_KEY: &str = "**** loaded ****";

/// Key-value storage used for both dictionary data and persisted settings
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Values for the keys that are present; absent keys are simply missing
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, String>, StoreError>;

    /// Insert or overwrite every pair
    async fn set(&self, items: HashMap<String, String>) -> Result<(), StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;

    async fn size_in_use_bytes(&self) -> Result<u64, StoreError>;
}

/// Whether the caller-owned loaded flag is set
pub async fn is_loaded(store: &dyn KeyValueStore) -> Result<bool, StoreError> {
    let keys = [LOADED_FLAG_KEY.to_string()];
    Ok(store
        .get(&keys)
        .await?
        .get(LOADED_FLAG_KEY)
        .is_some_and(|v| v == "true"))
}

pub async fn mark_loaded(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    store
        .set(HashMap::from([(LOADED_FLAG_KEY.to_string(), "true".to_string())]))
        .await
}

/// In-process store, mostly for tests and one-shot lookups
#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.map.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.map.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, String>, StoreError> {
        let map = self.map.read().await;
        Ok(keys
            .iter()
            .filter_map(|k| map.get(k).map(|v| (k.clone(), v.clone())))
            .collect())
    }

    async fn set(&self, items: HashMap<String, String>) -> Result<(), StoreError> {
        self.map.write().await.extend(items);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.map.write().await.clear();
        Ok(())
    }

    async fn size_in_use_bytes(&self) -> Result<u64, StoreError> {
        let map = self.map.read().await;
        Ok(map.iter().map(|(k, v)| (k.len() + v.len()) as u64).sum())
    }
}
