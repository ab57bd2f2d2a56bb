use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::store::{KeySchema, StoreError, StoreHandle};

/// Resolves a table's primary-key structure through the store.
///
/// With caching enabled, the first answer per table is kept for the life of
/// the process and never invalidated.
#[derive(Clone)]
pub struct KeySchemaResolver {
    store: StoreHandle,
    cache: Option<Arc<RwLock<HashMap<String, KeySchema>>>>,
}

impl KeySchemaResolver {
    pub fn new(store: StoreHandle, cache_enabled: bool) -> Self {
        Self {
            store,
            cache: cache_enabled.then(|| Arc::new(RwLock::new(HashMap::new()))),
        }
    }

    pub async fn resolve(&self, table: &str) -> Result<KeySchema, StoreError> {
        let Some(cache) = &self.cache else {
            return self.store.describe_key_schema(table).await;
        };

        // Fast path: try read lock
        {
            let cached = cache.read().await;
            if let Some(schema) = cached.get(table) {
                return Ok(schema.clone());
            }
        }

        let schema = self.store.describe_key_schema(table).await?;

        {
            let mut cached = cache.write().await;
            cached.insert(table.to_string(), schema.clone());
        }

        debug!("Cached key schema for table: {}", table);
        Ok(schema)
    }
}
