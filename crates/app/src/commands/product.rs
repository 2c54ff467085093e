//! Product command handlers.
//!
//! Each handler runs one unit of work end to end: validate the command
//! shape, enforce cross-aggregate rules through the repositories, mutate the
//! aggregate, save, then announce. Shape validation mirrors the domain
//! bounds so a command that passes here only fails deeper down when a rule
//! needs state (SKU uniqueness, parent existence).

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use validator::{Validate, ValidationError};

use shopforge_catalog::{Product, ProductAttribute, ProductCategory, Variant};
use shopforge_core::{AggregateRoot, CategoryId, DomainError, ProductId};
use shopforge_events::EventBus;
use shopforge_infra::{DocumentBackend, DocumentEntity, UnitOfWork};

use crate::announce::{CatalogEnvelope, announce_catalog_events};
use crate::error::{AppError, AppResult};

fn image_url_is_http(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::new("image_url_scheme"))
    }
}

// Same cap as the variant price bound: 999,999.99.
fn price_in_catalog_range(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO || *price > Decimal::new(99_999_999, 2) {
        return Err(ValidationError::new("price_out_of_range"));
    }
    Ok(())
}

#[derive(Debug, Clone, serde::Serialize, Validate)]
pub struct AttributeInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 500))]
    pub value: String,
}

#[derive(Debug, Clone, serde::Serialize, Validate)]
pub struct VariantInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    #[validate(custom(function = "price_in_catalog_range"))]
    pub price: Decimal,
    #[validate(range(max = 999_999))]
    pub stock_quantity: u32,
    #[validate(length(max = 20), nested)]
    pub attributes: Vec<AttributeInput>,
}

#[derive(Debug, Clone, Validate)]
pub struct CreateProductCommand {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    #[validate(length(min = 1, max = 500), custom(function = "image_url_is_http"))]
    pub image_url: Option<String>,
    #[validate(custom(function = "price_in_catalog_range"))]
    pub base_price: Option<Decimal>,
    /// Category associations as (id, display name) pairs.
    #[validate(length(max = 10))]
    pub category_ids: Vec<(CategoryId, String)>,
    #[validate(length(max = 100), nested)]
    pub variants: Vec<VariantInput>,
    #[validate(length(max = 10), nested)]
    pub attributes: Vec<AttributeInput>,
}

/// Creates a product aggregate, guarding SKU uniqueness across the catalog.
pub struct CreateProductCommandHandler<B> {
    backend: Arc<dyn DocumentBackend>,
    bus: B,
}

impl<B> CreateProductCommandHandler<B>
where
    B: EventBus<CatalogEnvelope>,
{
    pub fn new(backend: Arc<dyn DocumentBackend>, bus: B) -> Self {
        Self { backend, bus }
    }

    #[instrument(
        skip(self, command, cancel),
        fields(product_name = %command.name, variant_count = command.variants.len()),
        err
    )]
    pub async fn handle(
        &self,
        command: CreateProductCommand,
        cancel: &CancellationToken,
    ) -> AppResult<ProductId> {
        command.validate()?;

        // Duplicates inside the request are rejected before the store is
        // touched at all.
        let mut seen = HashSet::new();
        for variant in &command.variants {
            if !seen.insert(variant.sku.trim().to_lowercase()) {
                return Err(DomainError::validation(
                    "duplicate SKUs found within product variants",
                )
                .into());
            }
        }

        let uow = UnitOfWork::new(self.backend.clone());
        let products = uow.products();

        let request_skus: Vec<String> = command
            .variants
            .iter()
            .map(|variant| variant.sku.trim().to_string())
            .collect();
        if !request_skus.is_empty() && products.exists_skus(&request_skus, cancel).await? {
            let owners = products.products_with_skus(&request_skus, cancel).await?;
            let taken: HashSet<String> = owners
                .iter()
                .flat_map(|product| product.sku_list())
                .map(str::to_lowercase)
                .collect();
            // Report the spellings the caller submitted, in request order.
            let conflicting: Vec<&str> = request_skus
                .iter()
                .filter(|sku| taken.contains(&sku.to_lowercase()))
                .map(String::as_str)
                .collect();
            return Err(DomainError::invariant(format!(
                "SKUs already exist in other products: {}",
                conflicting.join(", ")
            ))
            .into());
        }

        let mut product = Product::create(
            command.name,
            command.description,
            command.image_url,
            command.base_price,
        )?;
        for (category_id, category_name) in command.category_ids {
            product.add_category(ProductCategory::new(category_id, category_name)?);
        }
        for input in command.variants {
            let mut variant = Variant::new(input.name, input.sku, input.price, input.stock_quantity)?;
            for attribute in input.attributes {
                variant.add_attribute(ProductAttribute::new(attribute.name, attribute.value)?)?;
            }
            product.add_variant(variant)?;
        }
        for attribute in command.attributes {
            product.add_attribute(ProductAttribute::new(attribute.name, attribute.value)?)?;
        }

        products.add(&product)?;
        uow.save_changes(cancel).await?;

        // Announcement happens strictly after the save so subscribers never
        // hear about a product that failed to persist.
        let product_id = *product.id();
        let saved_revision = product.revision() + 1;
        announce_catalog_events(
            &self.bus,
            Product::DOC_TYPE,
            *product_id.as_uuid(),
            saved_revision,
            product.take_events(),
        );

        Ok(product_id)
    }
}

#[derive(Debug, Clone, Validate)]
pub struct UpdateProductCommand {
    pub product_id: ProductId,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    #[validate(length(min = 1, max = 500), custom(function = "image_url_is_http"))]
    pub image_url: Option<String>,
    #[validate(custom(function = "price_in_catalog_range"))]
    pub base_price: Option<Decimal>,
}

/// Rewrites a product's basic details under an optimistic revision check.
pub struct UpdateProductCommandHandler {
    backend: Arc<dyn DocumentBackend>,
}

impl UpdateProductCommandHandler {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    #[instrument(skip(self, command, cancel), fields(product_id = %command.product_id.as_uuid()), err)]
    pub async fn handle(
        &self,
        command: UpdateProductCommand,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        command.validate()?;

        let uow = UnitOfWork::new(self.backend.clone());
        let products = uow.products();
        let mut product = products
            .get_by_id(command.product_id, cancel)
            .await?
            .ok_or_else(|| AppError::not_found("product", *command.product_id.as_uuid()))?;

        product.update_basic_info(command.name, command.description, command.image_url)?;
        product.set_base_price(command.base_price)?;

        products.update(&product)?;
        uow.save_changes(cancel).await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DeleteProductCommand {
    pub product_id: ProductId,
}

pub struct DeleteProductCommandHandler {
    backend: Arc<dyn DocumentBackend>,
}

impl DeleteProductCommandHandler {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    #[instrument(skip(self, command, cancel), fields(product_id = %command.product_id.as_uuid()), err)]
    pub async fn handle(
        &self,
        command: DeleteProductCommand,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        let uow = UnitOfWork::new(self.backend.clone());
        let products = uow.products();
        products
            .get_by_id(command.product_id, cancel)
            .await?
            .ok_or_else(|| AppError::not_found("product", *command.product_id.as_uuid()))?;
        products.delete_by_id(command.product_id)?;
        uow.save_changes(cancel).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn minimal_command() -> CreateProductCommand {
        CreateProductCommand {
            name: "Canvas Tote".to_string(),
            description: "A plain tote bag".to_string(),
            image_url: None,
            base_price: Some(dec!(19.99)),
            category_ids: Vec::new(),
            variants: vec![VariantInput {
                name: "Natural".to_string(),
                sku: "TOTE-NAT".to_string(),
                price: dec!(19.99),
                stock_quantity: 12,
                attributes: Vec::new(),
            }],
            attributes: Vec::new(),
        }
    }

    #[test]
    fn a_well_formed_command_passes_shape_validation() {
        assert!(minimal_command().validate().is_ok());
    }

    #[test]
    fn image_url_must_be_http_or_https() {
        let mut command = minimal_command();
        command.image_url = Some("ftp://cdn.example.com/tote.png".to_string());
        assert!(command.validate().is_err());

        command.image_url = Some("https://cdn.example.com/tote.png".to_string());
        assert!(command.validate().is_ok());
    }

    #[test]
    fn category_count_is_capped_at_ten() {
        let mut command = minimal_command();
        command.category_ids = (0..11)
            .map(|n| (CategoryId::new(), format!("Category {n}")))
            .collect();
        assert!(command.validate().is_err());

        command.category_ids.truncate(10);
        assert!(command.validate().is_ok());
    }

    #[test]
    fn variant_stock_and_price_bounds_are_enforced() {
        let mut command = minimal_command();
        command.variants[0].stock_quantity = 1_000_000;
        assert!(command.validate().is_err());

        let mut command = minimal_command();
        command.variants[0].price = dec!(1000000.00);
        assert!(command.validate().is_err());

        let mut command = minimal_command();
        command.variants[0].price = dec!(-0.01);
        assert!(command.validate().is_err());
    }

    #[test]
    fn nested_attribute_inputs_are_validated() {
        let mut command = minimal_command();
        command.variants[0].attributes.push(AttributeInput {
            name: String::new(),
            value: "cotton".to_string(),
        });
        assert!(command.validate().is_err());
    }

    #[test]
    fn base_price_above_the_catalog_cap_is_rejected() {
        let mut command = minimal_command();
        command.base_price = Some(dec!(1000000.00));
        assert!(command.validate().is_err());

        command.base_price = Some(dec!(999999.99));
        assert!(command.validate().is_ok());
    }
}
