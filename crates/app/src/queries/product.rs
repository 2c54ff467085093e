//! Product query handlers.
//!
//! Queries run untracked: the session never registers read-only results in
//! its identity map, and callers get DTOs rather than aggregates.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::instrument;
use validator::Validate;

use shopforge_catalog::specs;
use shopforge_core::{PaginatedResult, ProductId};
use shopforge_infra::{DocumentBackend, UnitOfWork};

use crate::error::{AppError, AppResult};
use crate::queries::dto::{ProductDetailsDto, ProductSummaryDto};

#[derive(Debug, Clone, Validate)]
pub struct GetProductsQuery {
    #[validate(range(min = 1))]
    pub page_number: usize,
    #[validate(range(min = 1, max = 100))]
    pub page_size: usize,
    /// When set, only products associated with this category name are listed.
    pub category_name: Option<String>,
}

pub struct GetProductsQueryHandler {
    backend: Arc<dyn DocumentBackend>,
}

impl GetProductsQueryHandler {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    #[instrument(
        skip(self, query, cancel),
        fields(page_number = query.page_number, page_size = query.page_size),
        err
    )]
    pub async fn handle(
        &self,
        query: GetProductsQuery,
        cancel: &CancellationToken,
    ) -> AppResult<PaginatedResult<ProductSummaryDto>> {
        query.validate()?;

        let uow = UnitOfWork::new(self.backend.clone());
        let spec = specs::products_listing(query.category_name.as_deref()).untracked();
        let page = uow
            .get_paginated_by_spec(spec, query.page_number, query.page_size, cancel)
            .await?;
        Ok(page.map(ProductSummaryDto::from))
    }
}

#[derive(Debug, Clone)]
pub struct GetProductByIdQuery {
    pub product_id: ProductId,
}

pub struct GetProductByIdQueryHandler {
    backend: Arc<dyn DocumentBackend>,
}

impl GetProductByIdQueryHandler {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    #[instrument(skip(self, query, cancel), fields(product_id = %query.product_id.as_uuid()), err)]
    pub async fn handle(
        &self,
        query: GetProductByIdQuery,
        cancel: &CancellationToken,
    ) -> AppResult<ProductDetailsDto> {
        let uow = UnitOfWork::new(self.backend.clone());
        let product = uow
            .products()
            .get_product_with_variants(query.product_id, cancel)
            .await?
            .ok_or_else(|| AppError::not_found("product", *query.product_id.as_uuid()))?;
        Ok(ProductDetailsDto::from(product))
    }
}
