//! Catalog-aware repository for products.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use shopforge_catalog::{Product, specs};
use shopforge_core::{CategoryId, PaginatedResult, ProductId};

use crate::document_store::StoreError;
use crate::repository::Repository;
use crate::session::DocumentSession;

/// [`Repository<Product>`] plus the catalog's named queries.
///
/// SKU comparisons are case-insensitive throughout; SKUs must be unique
/// across the whole catalog, not just within one product.
pub struct ProductRepository {
    inner: Repository<Product>,
}

impl ProductRepository {
    pub fn new(session: Arc<DocumentSession>) -> Self {
        Self {
            inner: Repository::new(session),
        }
    }

    pub async fn get_by_id(
        &self,
        id: ProductId,
        cancel: &CancellationToken,
    ) -> Result<Option<Product>, StoreError> {
        self.inner.get_by_id(*id.as_uuid(), cancel).await
    }

    /// Load a product with its variants.
    ///
    /// Documents embed variants, so this is a plain load; the include hint is
    /// carried for adapters with referential structure.
    pub async fn get_product_with_variants(
        &self,
        id: ProductId,
        cancel: &CancellationToken,
    ) -> Result<Option<Product>, StoreError> {
        self.inner
            .get_single_by_spec(specs::product_by_id(id).include("variants"), cancel)
            .await
    }

    pub async fn get_products_by_category(
        &self,
        category_id: CategoryId,
        page_number: usize,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResult<Product>, StoreError> {
        self.inner
            .get_paginated(
                specs::products_by_category(category_id),
                page_number,
                page_size,
                cancel,
            )
            .await
    }

    pub async fn get_products_in_stock(
        &self,
        page_number: usize,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResult<Product>, StoreError> {
        self.inner
            .get_paginated(specs::products_in_stock(), page_number, page_size, cancel)
            .await
    }

    /// Search name and description, optionally narrowed to one category.
    pub async fn search_products(
        &self,
        term: &str,
        category_id: Option<CategoryId>,
        page_number: usize,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResult<Product>, StoreError> {
        self.inner
            .get_paginated(
                specs::products_search(term, category_id),
                page_number,
                page_size,
                cancel,
            )
            .await
    }

    /// Whether any of the given SKUs is already taken by any product.
    pub async fn exists_skus(
        &self,
        skus: &[String],
        cancel: &CancellationToken,
    ) -> Result<bool, StoreError> {
        self.inner
            .exists(&specs::products_with_skus(skus), cancel)
            .await
    }

    /// The products holding any of the given SKUs. Used to report which SKUs
    /// are in conflict.
    pub async fn products_with_skus(
        &self,
        skus: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<Product>, StoreError> {
        self.inner
            .get_by_spec(specs::products_with_skus(skus), cancel)
            .await
    }

    pub fn add(&self, product: &Product) -> Result<(), StoreError> {
        self.inner.add(product)
    }

    pub fn update(&self, product: &Product) -> Result<(), StoreError> {
        self.inner.update(product)
    }

    pub fn delete_by_id(&self, id: ProductId) -> Result<(), StoreError> {
        self.inner.delete_by_id(*id.as_uuid())
    }
}
