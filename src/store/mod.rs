//! Backing key-value store capability.
//!
//! Everything above this module talks to the store through [`KeyValueStore`];
//! the composition root decides which implementation backs it.

pub mod memory;
pub mod types;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use memory::MemoryStore;
pub use types::{AttributeValue, Item, KeyAttribute, KeyAttributeType, KeyMap, KeySchema};

/// Errors reported by a store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableExists(String),

    #[error("Invalid key for table {table}: {message}")]
    InvalidKey { table: String, message: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store operation failed: {0}")]
    Internal(String),
}

/// CRUD and introspection calls consumed from the key-value store.
///
/// Every call is a single attempt; callers do not retry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Primary-key structure of `table`, or `TableNotFound`.
    async fn describe_key_schema(&self, table: &str) -> Result<KeySchema, StoreError>;

    /// Names of every table, sorted.
    async fn list_tables(&self) -> Result<Vec<String>, StoreError>;

    async fn create_table(&self, table: &str, schema: KeySchema) -> Result<(), StoreError>;

    /// Full scan of `table`.
    async fn scan(&self, table: &str) -> Result<Vec<Item>, StoreError>;

    /// Point lookup. Absence is `Ok(None)`.
    async fn get_item(&self, table: &str, key: &KeyMap) -> Result<Option<Item>, StoreError>;

    /// Unconditional upsert.
    async fn put_item(&self, table: &str, item: Item) -> Result<(), StoreError>;

    /// Delete by key. Deleting a missing key succeeds.
    async fn delete_item(&self, table: &str, key: &KeyMap) -> Result<(), StoreError>;
}

/// Shared handle passed to every component that needs the store
pub type StoreHandle = Arc<dyn KeyValueStore>;
