//! Read-side shapes returned by the query handlers.
//!
//! DTOs are built from loaded aggregates, so a query never hands out a type
//! the caller could mutate and save behind the handlers' backs.

use rust_decimal::Decimal;
use serde::Serialize;

use shopforge_catalog::{Category, Product, ProductAttribute, Variant};
use shopforge_core::{AggregateRoot, CategoryId, Entity, ProductId, VariantId};

#[derive(Debug, Clone, Serialize)]
pub struct AttributeDto {
    pub name: String,
    pub value: String,
}

impl From<&ProductAttribute> for AttributeDto {
    fn from(attribute: &ProductAttribute) -> Self {
        Self {
            name: attribute.name().to_string(),
            value: attribute.value().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VariantDto {
    pub id: VariantId,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub stock_quantity: u32,
    pub is_active: bool,
    pub in_stock: bool,
    pub attributes: Vec<AttributeDto>,
}

impl From<&Variant> for VariantDto {
    fn from(variant: &Variant) -> Self {
        Self {
            id: *variant.id(),
            name: variant.name().to_string(),
            sku: variant.sku().to_string(),
            price: variant.price(),
            stock_quantity: variant.stock_quantity(),
            is_active: variant.is_active(),
            in_stock: variant.is_in_stock(),
            attributes: variant.attributes().iter().map(AttributeDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAssociationDto {
    pub category_id: CategoryId,
    pub category_name: String,
}

/// Flat listing row: enough to render a product card without the variants.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummaryDto {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub effective_price: Decimal,
    pub variant_count: usize,
    pub category_names: Vec<String>,
    pub in_stock: bool,
}

impl From<Product> for ProductSummaryDto {
    fn from(product: Product) -> Self {
        Self {
            id: *product.id(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            image_url: product.image_url().map(str::to_string),
            effective_price: product.effective_price(),
            variant_count: product.variants().len(),
            category_names: product
                .categories()
                .iter()
                .map(|category| category.category_name().to_string())
                .collect(),
            in_stock: product.is_in_stock(),
        }
    }
}

/// Full detail view: variants with their attributes, associations, the lot.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetailsDto {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub base_price: Option<Decimal>,
    pub effective_price: Decimal,
    pub in_stock: bool,
    pub total_stock: u64,
    pub categories: Vec<CategoryAssociationDto>,
    pub variants: Vec<VariantDto>,
    pub attributes: Vec<AttributeDto>,
}

impl From<Product> for ProductDetailsDto {
    fn from(product: Product) -> Self {
        Self {
            id: *product.id(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            image_url: product.image_url().map(str::to_string),
            base_price: product.base_price(),
            effective_price: product.effective_price(),
            in_stock: product.is_in_stock(),
            total_stock: product.total_stock(),
            categories: product
                .categories()
                .iter()
                .map(|category| CategoryAssociationDto {
                    category_id: *category.category_id(),
                    category_name: category.category_name().to_string(),
                })
                .collect(),
            variants: product.variants().iter().map(VariantDto::from).collect(),
            attributes: product.attributes().iter().map(AttributeDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDto {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub parent_category_id: Option<CategoryId>,
    pub is_root: bool,
    pub is_active: bool,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: *category.id(),
            name: category.name().to_string(),
            description: category.description().to_string(),
            parent_category_id: category.parent_category_id().copied(),
            is_root: category.is_root(),
            is_active: category.is_active(),
        }
    }
}
