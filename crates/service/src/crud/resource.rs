use serde::{de::DeserializeOwned, Serialize};

use crate::errors::ServiceError;
use crate::store::EntityStore;

/// Field-level checks run before any transaction is opened.
pub trait Validate {
    fn validate(&self) -> Result<(), ServiceError>;
}

/// Binds one resource kind to its store and DTO mapper.
///
/// `apply_insert`/`apply_update` copy every writable field of the DTO into the
/// entity, including the association list; the DTO's `id` is ignored.
pub trait Resource: Send + Sync + 'static {
    /// Resource name used in errors, logs and metrics.
    const NAME: &'static str;

    type Entity: Send + Sync + 'static;
    type Store: EntityStore<Entity = Self::Entity> + Default;
    type Dto: Serialize + Send + Sync;
    type InsertDto: Validate + DeserializeOwned + Send + Sync;
    type UpdateDto: Validate + DeserializeOwned + Send + Sync;

    fn to_dto(entity: &Self::Entity) -> Self::Dto;

    fn dto_id(dto: &Self::Dto) -> Option<i32>;

    fn apply_insert(dto: &Self::InsertDto, entity: &mut Self::Entity) -> Result<(), ServiceError>;

    fn apply_update(dto: &Self::UpdateDto, entity: &mut Self::Entity) -> Result<(), ServiceError>;
}
