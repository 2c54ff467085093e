//! Unit of work: one session, typed repositories on demand.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use shopforge_core::{AggregateRoot, PaginatedResult, Specification};

use crate::document_store::{DocumentBackend, DocumentEntity, StoreError};
use crate::product_repository::ProductRepository;
use crate::repository::Repository;
use crate::session::DocumentSession;

/// Owns one [`DocumentSession`] per logical operation and hands out
/// repositories bound to it.
///
/// Repositories are constructed generically at compile time; the `TypeId`
/// map is only a cache so repeated calls return the same instance. All
/// repositories share the session, so their staged changes commit together
/// in one `save_changes` batch. Dropping the unit of work releases the
/// session and everything staged in it.
pub struct UnitOfWork {
    session: Arc<DocumentSession>,
    repositories: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl UnitOfWork {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            session: Arc::new(DocumentSession::new(backend)),
            repositories: Mutex::new(HashMap::new()),
        }
    }

    /// The repository for aggregate type `T`, cached per unit of work.
    pub fn repository<T>(&self) -> Arc<Repository<T>>
    where
        T: DocumentEntity + AggregateRoot,
    {
        self.cached(Repository::new)
    }

    /// The catalog's product repository.
    pub fn products(&self) -> Arc<ProductRepository> {
        self.cached(ProductRepository::new)
    }

    fn cached<R, F>(&self, build: F) -> Arc<R>
    where
        R: Send + Sync + 'static,
        F: FnOnce(Arc<DocumentSession>) -> R,
    {
        let mut repositories = self
            .repositories
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = repositories.get(&TypeId::of::<R>()) {
            if let Ok(repository) = existing.clone().downcast::<R>() {
                return repository;
            }
        }

        let repository = Arc::new(build(self.session.clone()));
        repositories.insert(TypeId::of::<R>(), repository.clone());
        repository
    }

    pub async fn get_single_by_spec<T>(
        &self,
        spec: Specification<T>,
        cancel: &CancellationToken,
    ) -> Result<Option<T>, StoreError>
    where
        T: DocumentEntity + AggregateRoot,
    {
        self.repository::<T>().get_single_by_spec(spec, cancel).await
    }

    pub async fn get_list_by_spec<T>(
        &self,
        spec: Specification<T>,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, StoreError>
    where
        T: DocumentEntity + AggregateRoot,
    {
        self.repository::<T>().get_by_spec(spec, cancel).await
    }

    pub async fn get_paginated_by_spec<T>(
        &self,
        spec: Specification<T>,
        page_number: usize,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResult<T>, StoreError>
    where
        T: DocumentEntity + AggregateRoot,
    {
        self.repository::<T>()
            .get_paginated(spec, page_number, page_size, cancel)
            .await
    }

    pub async fn count_by_spec<T>(
        &self,
        spec: Option<&Specification<T>>,
        cancel: &CancellationToken,
    ) -> Result<usize, StoreError>
    where
        T: DocumentEntity + AggregateRoot,
    {
        self.repository::<T>().count(spec, cancel).await
    }

    pub async fn exists_by_spec<T>(
        &self,
        spec: &Specification<T>,
        cancel: &CancellationToken,
    ) -> Result<bool, StoreError>
    where
        T: DocumentEntity + AggregateRoot,
    {
        self.repository::<T>().exists(spec, cancel).await
    }

    /// Commit everything staged across this unit of work's repositories.
    pub async fn save_changes(&self, cancel: &CancellationToken) -> Result<(), StoreError> {
        self.session.save_changes(cancel).await
    }
}
