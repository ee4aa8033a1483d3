//! Persistence port used by the generic CRUD service.
//!
//! Every store works inside a transaction owned by the caller; stores never
//! begin, commit or roll back on their own.

use async_trait::async_trait;
use sea_orm::{DatabaseTransaction, DbErr};
use thiserror::Error;

use crate::pagination::PageRequest;

pub mod category;
pub mod product;
pub mod query;
pub mod reference;
pub mod user;

pub use category::{CategoryEntity, SeaOrmCategoryStore};
pub use product::{ProductEntity, SeaOrmProductStore};
pub use reference::{Identified, Reference};
pub use user::{SeaOrmUserStore, UserEntity};

/// Raw store failures, translated into `ServiceError` by the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no row with id {0}")]
    RowAbsent(i32),
    #[error("referenced {resource} {id} does not exist")]
    DanglingReference { resource: &'static str, id: i32 },
    #[error("unknown sort property `{0}`")]
    UnknownSortKey(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EntityStore: Send + Sync {
    type Entity: Send + Sync + 'static;

    /// Blank entity without identity; `save` inserts it.
    fn new_entity(&self) -> Self::Entity;

    /// Entity carrying only `id`, built without touching the database.
    /// Saving it updates the row and reports a missing row at that point.
    fn get_reference(&self, id: i32) -> Self::Entity;

    async fn find_by_id(&self, tx: &DatabaseTransaction, id: i32) -> StoreResult<Option<Self::Entity>>;

    /// Insert when the entity has no id, update otherwise. Associations are
    /// resolved and replaced wholesale.
    async fn save(&self, tx: &DatabaseTransaction, entity: Self::Entity) -> StoreResult<Self::Entity>;

    /// `RowAbsent` when nothing was deleted.
    async fn delete_by_id(&self, tx: &DatabaseTransaction, id: i32) -> StoreResult<()>;

    /// Content of the requested page plus the total number of matching rows.
    async fn find_page(&self, tx: &DatabaseTransaction, request: &PageRequest) -> StoreResult<(Vec<Self::Entity>, u64)>;
}
