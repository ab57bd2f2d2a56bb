use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::database::item_id::{self, CodecError, ID_FIELD};
use crate::database::key_schema::KeySchemaResolver;
use crate::store::{AttributeValue, Item, KeyAttributeType, KeySchema, StoreError, StoreHandle};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Item data is required")]
    EmptyPayload,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Schema-agnostic CRUD over one named table.
///
/// Items come back annotated with their computed id under `__id`.
pub struct TableRepository {
    table_name: String,
    store: StoreHandle,
    resolver: KeySchemaResolver,
}

impl TableRepository {
    pub fn new(table_name: impl Into<String>, store: StoreHandle, resolver: KeySchemaResolver) -> Self {
        Self {
            table_name: table_name.into(),
            store,
            resolver,
        }
    }

    async fn key_schema(&self) -> Result<KeySchema, TableError> {
        Ok(self.resolver.resolve(&self.table_name).await?)
    }

    /// Full scan, id-annotated
    pub async fn list(&self) -> Result<Vec<Item>, TableError> {
        let schema = self.key_schema().await?;
        let items = self.store.scan(&self.table_name).await?;
        Ok(items
            .into_iter()
            .map(|item| item_id::with_id(item, &schema))
            .collect())
    }

    /// Point lookup by id. `None` when nothing matches.
    pub async fn get(&self, item_id: &str) -> Result<Option<Item>, TableError> {
        let schema = self.key_schema().await?;
        let key = item_id::decode(item_id, &schema)?;
        let found = self.store.get_item(&self.table_name, &key).await?;
        Ok(found.map(|item| item_id::with_id(item, &schema)))
    }

    /// Upsert a new item, generating any key attribute the caller left out.
    ///
    /// Caller-supplied keys that already exist are overwritten.
    pub async fn create(&self, payload: Item) -> Result<Item, TableError> {
        let mut item = strip_id(payload);
        if item.is_empty() {
            return Err(TableError::EmptyPayload);
        }

        let schema = self.key_schema().await?;
        for attr in schema.attributes() {
            let missing = item.get(&attr.name).map_or(true, AttributeValue::is_blank);
            if missing {
                let generated = generate_key_value(attr.attribute_type);
                debug!(
                    "Generated key {}={} for table {}",
                    attr.name,
                    generated.to_key_string(),
                    self.table_name
                );
                item.insert(attr.name.clone(), generated);
            }
        }

        self.store.put_item(&self.table_name, item.clone()).await?;
        Ok(item_id::with_id(item, &schema))
    }

    /// Replace the item addressed by `item_id`. The decoded key wins over any
    /// key attributes present in the payload.
    pub async fn update(&self, item_id: &str, payload: Item) -> Result<Item, TableError> {
        let mut item = strip_id(payload);
        if item.is_empty() {
            return Err(TableError::EmptyPayload);
        }

        let schema = self.key_schema().await?;
        let key = item_id::decode(item_id, &schema)?;
        item.extend(key);

        self.store.put_item(&self.table_name, item.clone()).await?;
        Ok(item_id::with_id(item, &schema))
    }

    /// Delete by id. Missing items are not an error.
    pub async fn delete(&self, item_id: &str) -> Result<(), TableError> {
        let schema = self.key_schema().await?;
        let key = item_id::decode(item_id, &schema)?;
        self.store.delete_item(&self.table_name, &key).await?;
        Ok(())
    }

    /// Number of items, via a full scan
    pub async fn count(&self) -> Result<usize, TableError> {
        Ok(self.store.scan(&self.table_name).await?.len())
    }
}

fn strip_id(mut payload: Item) -> Item {
    payload.remove(ID_FIELD);
    payload
}

fn generate_key_value(attribute_type: KeyAttributeType) -> AttributeValue {
    match attribute_type {
        KeyAttributeType::String => AttributeValue::String(Uuid::new_v4().to_string()),
        // 53 random bits keep the value exact in any JSON client
        KeyAttributeType::Number => AttributeValue::from((Uuid::new_v4().as_u128() >> 75) as u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyAttribute, KeyValueStore, MemoryStore};
    use std::sync::Arc;

    async fn setup() -> (StoreHandle, KeySchemaResolver) {
        let store = MemoryStore::new();
        store
            .create_table("branch", KeySchema::simple(KeyAttribute::string("branch_name")))
            .await
            .unwrap();
        store
            .create_table(
                "borrower",
                KeySchema::composite(
                    KeyAttribute::string("customer_name"),
                    KeyAttribute::string("loan_number"),
                ),
            )
            .await
            .unwrap();
        store
            .create_table("account", KeySchema::simple(KeyAttribute::number("account_number")))
            .await
            .unwrap();
        let store: StoreHandle = Arc::new(store);
        let resolver = KeySchemaResolver::new(store.clone(), true);
        (store, resolver)
    }

    fn item(pairs: &[(&str, &str)]) -> Item {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), AttributeValue::from(*v)))
            .collect()
    }

    #[tokio::test]
    async fn create_then_list_and_get() {
        let (store, resolver) = setup().await;
        let repo = TableRepository::new("borrower", store, resolver);

        let created = repo
            .create(item(&[("customer_name", "Ana"), ("loan_number", "L-10"), ("amount", "100")]))
            .await
            .unwrap();
        assert_eq!(created[ID_FIELD], AttributeValue::from("Ana::L-10"));

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0][ID_FIELD], AttributeValue::from("Ana::L-10"));

        let fetched = repo.get("Ana::L-10").await.unwrap().unwrap();
        assert_eq!(fetched["amount"], AttributeValue::from("100"));
    }

    #[tokio::test]
    async fn create_generates_missing_keys() {
        let (store, resolver) = setup().await;

        let branches = TableRepository::new("branch", store.clone(), resolver.clone());
        let created = branches.create(item(&[("branch_city", "SP")])).await.unwrap();
        let generated = created["branch_name"].as_str().unwrap();
        assert!(Uuid::parse_str(generated).is_ok());
        assert!(branches.get(generated).await.unwrap().is_some());

        // Empty strings count as missing
        let created = branches
            .create(item(&[("branch_name", ""), ("branch_city", "RJ")]))
            .await
            .unwrap();
        assert!(!created["branch_name"].is_blank());

        let accounts = TableRepository::new("account", store, resolver);
        let created = accounts.create(item(&[("balance", "10")])).await.unwrap();
        assert!(matches!(created["account_number"], AttributeValue::Number(_)));
        let id = created[ID_FIELD].as_str().unwrap().to_string();
        assert!(accounts.get(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn create_rejects_empty_payload() {
        let (store, resolver) = setup().await;
        let repo = TableRepository::new("branch", store, resolver);
        assert!(matches!(repo.create(Item::new()).await, Err(TableError::EmptyPayload)));
        assert!(matches!(
            repo.create(item(&[(ID_FIELD, "x")])).await,
            Err(TableError::EmptyPayload)
        ));
    }

    #[tokio::test]
    async fn create_is_an_upsert() {
        let (store, resolver) = setup().await;
        let repo = TableRepository::new("branch", store, resolver);
        repo.create(item(&[("branch_name", "BR1"), ("branch_city", "SP")])).await.unwrap();
        repo.create(item(&[("branch_name", "BR1"), ("branch_city", "RJ")])).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["branch_city"], AttributeValue::from("RJ"));
    }

    #[tokio::test]
    async fn update_keeps_decoded_key_authoritative() {
        let (store, resolver) = setup().await;
        let repo = TableRepository::new("borrower", store, resolver);
        repo.create(item(&[("customer_name", "Ana"), ("loan_number", "L-10")]))
            .await
            .unwrap();

        let updated = repo
            .update(
                "Ana::L-10",
                item(&[("customer_name", "Bob"), ("amount", "250"), (ID_FIELD, "junk")]),
            )
            .await
            .unwrap();
        assert_eq!(updated["customer_name"], AttributeValue::from("Ana"));
        assert_eq!(updated[ID_FIELD], AttributeValue::from("Ana::L-10"));

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["amount"], AttributeValue::from("250"));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (store, resolver) = setup().await;
        let repo = TableRepository::new("branch", store, resolver);
        repo.create(item(&[("branch_name", "BR1")])).await.unwrap();

        repo.delete("BR1").await.unwrap();
        repo.delete("BR1").await.unwrap();
        assert!(repo.get("BR1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_table_and_bad_ids() {
        let (store, resolver) = setup().await;
        let missing = TableRepository::new("nope", store.clone(), resolver.clone());
        assert!(matches!(
            missing.list().await,
            Err(TableError::Store(StoreError::TableNotFound(_)))
        ));

        let accounts = TableRepository::new("account", store, resolver);
        assert!(matches!(accounts.get("abc").await, Err(TableError::Codec(_))));
    }
}
