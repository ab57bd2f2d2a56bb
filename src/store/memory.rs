use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::types::{AttributeValue, Item, KeyAttribute, KeyAttributeType, KeyMap, KeySchema};
use super::{KeyValueStore, StoreError};

/// Canonical storage key: partition text plus optional sort text
type StorageKey = (String, Option<String>);

struct MemoryTable {
    schema: KeySchema,
    items: BTreeMap<StorageKey, Item>,
}

/// In-process key-value store.
///
/// Enforces the same key rules a hosted store would: every key attribute must
/// be present and of its declared scalar type.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, MemoryTable>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_component(
        table: &str,
        attr: &KeyAttribute,
        source: &BTreeMap<String, AttributeValue>,
    ) -> Result<String, StoreError> {
        let invalid = |message: String| StoreError::InvalidKey {
            table: table.to_string(),
            message,
        };

        let value = source
            .get(&attr.name)
            .ok_or_else(|| invalid(format!("missing key attribute '{}'", attr.name)))?;

        match (attr.attribute_type, value) {
            (KeyAttributeType::String, AttributeValue::String(s)) if !s.is_empty() => Ok(s.clone()),
            (KeyAttributeType::Number, AttributeValue::Number(n)) => Ok(n.to_string()),
            _ => Err(invalid(format!(
                "key attribute '{}' has the wrong type or is empty",
                attr.name
            ))),
        }
    }

    fn storage_key(
        table: &str,
        schema: &KeySchema,
        source: &BTreeMap<String, AttributeValue>,
    ) -> Result<StorageKey, StoreError> {
        let partition = Self::key_component(table, &schema.partition_key, source)?;
        let sort = match &schema.sort_key {
            Some(attr) => Some(Self::key_component(table, attr, source)?),
            None => None,
        };
        Ok((partition, sort))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn describe_key_schema(&self, table: &str) -> Result<KeySchema, StoreError> {
        let tables = self.tables.read().await;
        tables
            .get(table)
            .map(|t| t.schema.clone())
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    async fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        let tables = self.tables.read().await;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create_table(&self, table: &str, schema: KeySchema) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.contains_key(table) {
            return Err(StoreError::TableExists(table.to_string()));
        }
        tables.insert(
            table.to_string(),
            MemoryTable {
                schema,
                items: BTreeMap::new(),
            },
        );
        info!("Created table: {}", table);
        Ok(())
    }

    async fn scan(&self, table: &str) -> Result<Vec<Item>, StoreError> {
        let tables = self.tables.read().await;
        let t = tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        Ok(t.items.values().cloned().collect())
    }

    async fn get_item(&self, table: &str, key: &KeyMap) -> Result<Option<Item>, StoreError> {
        let tables = self.tables.read().await;
        let t = tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let storage_key = Self::storage_key(table, &t.schema, key)?;
        Ok(t.items.get(&storage_key).cloned())
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let storage_key = Self::storage_key(table, &t.schema, &item)?;
        t.items.insert(storage_key, item);
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &KeyMap) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let storage_key = Self::storage_key(table, &t.schema, key)?;
        t.items.remove(&storage_key);
        Ok(())
    }
}
