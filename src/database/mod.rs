pub mod item_id;
pub mod key_schema;
pub mod models;
pub mod roles;
pub mod table_repository;
pub mod tokens;
pub mod users;

use thiserror::Error;

use crate::store::StoreError;

pub use key_schema::KeySchemaResolver;
pub use roles::RoleRepository;
pub use table_repository::{TableError, TableRepository};
pub use tokens::TokenRepository;
pub use users::UserRepository;

/// Errors from the typed system-table repositories
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Stored record is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
