//! Generic repository over the document session.

use std::marker::PhantomData;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use shopforge_core::{AggregateRoot, PaginatedResult, Specification};

use crate::document_store::{DocumentEntity, StoreError};
use crate::session::DocumentSession;

/// Typed facade over a [`DocumentSession`] for one aggregate type.
///
/// Repositories are thin: queries delegate to the session, and mutations only
/// stage; nothing reaches the store until the owning unit of work saves.
pub struct Repository<T> {
    session: Arc<DocumentSession>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Repository<T>
where
    T: DocumentEntity + AggregateRoot,
{
    pub fn new(session: Arc<DocumentSession>) -> Self {
        Self {
            session,
            _marker: PhantomData,
        }
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<T>, StoreError> {
        self.session.load::<T>(id, cancel).await
    }

    pub async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<T>, StoreError> {
        self.session.query(Specification::new(), cancel).await
    }

    pub async fn get_by_spec(
        &self,
        spec: Specification<T>,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, StoreError> {
        self.session.query(spec, cancel).await
    }

    /// First match of the specification, honoring its ordering.
    pub async fn get_single_by_spec(
        &self,
        spec: Specification<T>,
        cancel: &CancellationToken,
    ) -> Result<Option<T>, StoreError> {
        let mut results = self.session.query(spec.page(0, 1), cancel).await?;
        Ok(results.pop())
    }

    /// Run a page query: one count over the filter alone, one items query
    /// with the full specification and the derived window.
    ///
    /// `page_number` is 1-based; any window the specification already carries
    /// is replaced.
    pub async fn get_paginated(
        &self,
        spec: Specification<T>,
        page_number: usize,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResult<T>, StoreError> {
        let total_count = self.session.count(Some(&spec), cancel).await?;
        let skip = page_number.saturating_sub(1) * page_size;
        let items = self
            .session
            .query(spec.page(skip, page_size), cancel)
            .await?;
        Ok(PaginatedResult::new(
            items, total_count, page_number, page_size,
        ))
    }

    pub async fn count(
        &self,
        spec: Option<&Specification<T>>,
        cancel: &CancellationToken,
    ) -> Result<usize, StoreError> {
        self.session.count(spec, cancel).await
    }

    pub async fn exists(
        &self,
        spec: &Specification<T>,
        cancel: &CancellationToken,
    ) -> Result<bool, StoreError> {
        self.session.exists(spec, cancel).await
    }

    pub async fn exists_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<bool, StoreError> {
        Ok(self.session.load::<T>(id, cancel).await?.is_some())
    }

    /// Stage a first save of a new aggregate.
    pub fn add(&self, entity: &T) -> Result<(), StoreError> {
        self.session.stage_insert(entity)
    }

    /// Stage an update guarded by the aggregate's loaded revision.
    pub fn update(&self, entity: &T) -> Result<(), StoreError> {
        self.session.stage_update(entity)
    }

    pub fn delete(&self, entity: &T) -> Result<(), StoreError> {
        self.session.stage_delete(entity)
    }

    pub fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        self.session.stage_delete_by_id::<T>(id)
    }
}
