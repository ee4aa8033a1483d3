//! Transactional CRUD service, generic over the resource kind.
//!
//! Each public operation runs in exactly one transaction. Reads use a
//! read-only transaction where the backend supports it; writes commit only
//! when every step succeeded and otherwise roll back when the transaction
//! is dropped.

use std::marker::PhantomData;

use sea_orm::{AccessMode, ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, info, instrument};

use crate::errors::ServiceError;
use crate::pagination::{Page, PageRequest, MAX_PAGE_SIZE};
use crate::store::EntityStore;
use crate::translate::{ErrorTranslator, Operation};

mod resource;

pub use resource::{Resource, Validate};

pub struct CrudService<K: Resource> {
    db: DatabaseConnection,
    store: K::Store,
    max_page_size: u64,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Resource> CrudService<K> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, store: K::Store::default(), max_page_size: MAX_PAGE_SIZE, _kind: PhantomData }
    }

    pub fn with_max_page_size(mut self, max_page_size: u64) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }

    async fn begin(&self, read_only: bool, translator: &ErrorTranslator) -> Result<DatabaseTransaction, ServiceError> {
        // access mode is only sent to Postgres
        let access = (read_only && self.db.get_database_backend() == DatabaseBackend::Postgres).then_some(AccessMode::ReadOnly);
        self.db.begin_with_config(None, access).await.map_err(|e| translator.translate(e.into()))
    }

    async fn commit(tx: DatabaseTransaction, translator: &ErrorTranslator) -> Result<(), ServiceError> {
        tx.commit().await.map_err(|e| translator.translate(e.into()))
    }

    /// Page of DTOs ordered as requested; an out-of-range page is empty.
    #[instrument(skip(self, request), fields(resource = K::NAME, page = request.page, size = request.size))]
    pub async fn find_all_paged(&self, request: PageRequest) -> Result<Page<K::Dto>, ServiceError> {
        let result = self.find_all_paged_inner(request).await;
        observe(K::NAME, Operation::List, result)
    }

    async fn find_all_paged_inner(&self, request: PageRequest) -> Result<Page<K::Dto>, ServiceError> {
        let request = request.normalize(self.max_page_size)?;
        let translator = ErrorTranslator::new(K::NAME, Operation::List);
        let tx = self.begin(true, &translator).await?;
        let (entities, total) = self.store.find_page(&tx, &request).await.map_err(|e| translator.translate(e))?;
        Self::commit(tx, &translator).await?;
        Ok(Page::new(entities, &request, total).map(|entity| K::to_dto(&entity)))
    }

    #[instrument(skip(self), fields(resource = K::NAME))]
    pub async fn find_by_id(&self, id: i32) -> Result<K::Dto, ServiceError> {
        let result = self.find_by_id_inner(id).await;
        observe(K::NAME, Operation::Read, result)
    }

    async fn find_by_id_inner(&self, id: i32) -> Result<K::Dto, ServiceError> {
        let translator = ErrorTranslator::new(K::NAME, Operation::Read).with_id(id);
        let tx = self.begin(true, &translator).await?;
        let found = self.store.find_by_id(&tx, id).await.map_err(|e| translator.translate(e))?;
        Self::commit(tx, &translator).await?;
        found.as_ref().map(K::to_dto).ok_or_else(|| ServiceError::not_found(K::NAME, id))
    }

    /// Persist a new entity; the DTO's `id` is ignored and a fresh one assigned.
    #[instrument(skip(self, dto), fields(resource = K::NAME))]
    pub async fn insert(&self, dto: K::InsertDto) -> Result<K::Dto, ServiceError> {
        let result = self.insert_inner(&dto).await;
        observe(K::NAME, Operation::Insert, result)
    }

    async fn insert_inner(&self, dto: &K::InsertDto) -> Result<K::Dto, ServiceError> {
        dto.validate()?;
        let mut entity = self.store.new_entity();
        K::apply_insert(dto, &mut entity)?;
        let translator = ErrorTranslator::new(K::NAME, Operation::Insert);
        let tx = self.begin(false, &translator).await?;
        let saved = self.store.save(&tx, entity).await.map_err(|e| translator.translate(e))?;
        Self::commit(tx, &translator).await?;
        Ok(K::to_dto(&saved))
    }

    /// Overwrite every writable field of entity `id`.
    ///
    /// No read happens before the write: a missing row is detected when the
    /// update is flushed and reported as `NotFound`.
    #[instrument(skip(self, dto), fields(resource = K::NAME))]
    pub async fn update(&self, id: i32, dto: K::UpdateDto) -> Result<K::Dto, ServiceError> {
        let result = self.update_inner(id, &dto).await;
        observe(K::NAME, Operation::Update, result)
    }

    async fn update_inner(&self, id: i32, dto: &K::UpdateDto) -> Result<K::Dto, ServiceError> {
        dto.validate()?;
        let mut entity = self.store.get_reference(id);
        K::apply_update(dto, &mut entity)?;
        let translator = ErrorTranslator::new(K::NAME, Operation::Update).with_id(id);
        let tx = self.begin(false, &translator).await?;
        let saved = self.store.save(&tx, entity).await.map_err(|e| translator.translate(e))?;
        Self::commit(tx, &translator).await?;
        Ok(K::to_dto(&saved))
    }

    #[instrument(skip(self), fields(resource = K::NAME))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let result = self.delete_inner(id).await;
        observe(K::NAME, Operation::Delete, result)
    }

    async fn delete_inner(&self, id: i32) -> Result<(), ServiceError> {
        let translator = ErrorTranslator::new(K::NAME, Operation::Delete).with_id(id);
        let tx = self.begin(false, &translator).await?;
        self.store.delete_by_id(&tx, id).await.map_err(|e| translator.translate(e))?;
        Self::commit(tx, &translator).await
    }
}

fn observe<T>(resource: &'static str, operation: Operation, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
    let outcome = match &result {
        Ok(_) => {
            debug!(operation = operation.as_str(), "ok");
            "ok"
        }
        Err(e @ ServiceError::Storage) => e.kind(),
        Err(e) => {
            info!(operation = operation.as_str(), code = e.code(), error = %e, "request rejected");
            e.kind()
        }
    };
    common::metrics::record_operation(resource, operation.as_str(), outcome);
    result
}

#[cfg(test)]
mod tests;
