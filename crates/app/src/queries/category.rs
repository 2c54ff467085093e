//! Category query handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::instrument;
use validator::Validate;

use shopforge_catalog::specs;
use shopforge_core::{CategoryId, PaginatedResult};
use shopforge_infra::{DocumentBackend, UnitOfWork};

use crate::error::{AppError, AppResult};
use crate::queries::dto::CategoryDto;

#[derive(Debug, Clone, Validate)]
pub struct GetCategoriesQuery {
    #[validate(range(min = 1))]
    pub page_number: usize,
    #[validate(range(min = 1, max = 100))]
    pub page_size: usize,
    pub root_only: bool,
    pub active_only: bool,
}

pub struct GetCategoriesQueryHandler {
    backend: Arc<dyn DocumentBackend>,
}

impl GetCategoriesQueryHandler {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    #[instrument(
        skip(self, query, cancel),
        fields(page_number = query.page_number, root_only = query.root_only),
        err
    )]
    pub async fn handle(
        &self,
        query: GetCategoriesQuery,
        cancel: &CancellationToken,
    ) -> AppResult<PaginatedResult<CategoryDto>> {
        query.validate()?;

        let uow = UnitOfWork::new(self.backend.clone());
        let spec = specs::categories_listing(query.root_only, query.active_only).untracked();
        let page = uow
            .get_paginated_by_spec(spec, query.page_number, query.page_size, cancel)
            .await?;
        Ok(page.map(CategoryDto::from))
    }
}

#[derive(Debug, Clone)]
pub struct GetCategoryByIdQuery {
    pub category_id: CategoryId,
}

pub struct GetCategoryByIdQueryHandler {
    backend: Arc<dyn DocumentBackend>,
}

impl GetCategoryByIdQueryHandler {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    #[instrument(skip(self, query, cancel), fields(category_id = %query.category_id.as_uuid()), err)]
    pub async fn handle(
        &self,
        query: GetCategoryByIdQuery,
        cancel: &CancellationToken,
    ) -> AppResult<CategoryDto> {
        let uow = UnitOfWork::new(self.backend.clone());
        let category = uow
            .get_single_by_spec(specs::category_by_id(query.category_id).untracked(), cancel)
            .await?
            .ok_or_else(|| AppError::not_found("category", *query.category_id.as_uuid()))?;
        Ok(CategoryDto::from(category))
    }
}
