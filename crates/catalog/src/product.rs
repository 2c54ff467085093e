use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopforge_core::{
    AggregateRoot, CategoryId, DomainError, DomainResult, Entity, ProductId, ValueObject, VariantId,
};

use crate::attribute::ProductAttribute;
use crate::events::{CatalogEvent, ProductCreated};
use crate::variant::{Variant, max_price};

const MAX_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_IMAGE_URL_LEN: usize = 500;
const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Association between a product and a category it is listed under.
///
/// Value object compared by `category_id` alone; the denormalized name is a
/// display convenience and does not participate in equality.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    category_id: CategoryId,
    category_name: String,
}

impl ProductCategory {
    pub fn new(category_id: CategoryId, category_name: impl Into<String>) -> DomainResult<Self> {
        let category_name = category_name.into().trim().to_string();
        if category_name.is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }
        if category_name.chars().count() > MAX_CATEGORY_NAME_LEN {
            return Err(DomainError::validation(format!(
                "category name cannot exceed {MAX_CATEGORY_NAME_LEN} characters"
            )));
        }
        Ok(Self {
            category_id,
            category_name,
        })
    }

    pub fn category_id(&self) -> &CategoryId {
        &self.category_id
    }

    pub fn category_name(&self) -> &str {
        &self.category_name
    }
}

impl PartialEq for ProductCategory {
    fn eq(&self, other: &Self) -> bool {
        self.category_id == other.category_id
    }
}

impl core::hash::Hash for ProductCategory {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.category_id.hash(state);
    }
}

impl ValueObject for ProductCategory {}

/// Aggregate root: a catalog product with embedded variants, attributes and
/// category associations.
///
/// One document per product; the `revision` field is stamped by the store on
/// every successful save and drives optimistic concurrency. Queued domain
/// events never reach the document (`serde(skip)`); handlers drain them with
/// [`Product::take_events`] after the save commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    image_url: Option<String>,
    base_price: Option<Decimal>,
    categories: Vec<ProductCategory>,
    variants: Vec<Variant>,
    attributes: Vec<ProductAttribute>,
    revision: u64,
    #[serde(skip)]
    events: Vec<CatalogEvent>,
}

impl Product {
    /// Factory: validates every scalar bound and queues the creation event.
    pub fn create(
        name: impl Into<String>,
        description: impl Into<String>,
        image_url: Option<String>,
        base_price: Option<Decimal>,
    ) -> DomainResult<Self> {
        let name = validate_name(name.into())?;
        let description = validate_description(description.into())?;
        let image_url = validate_image_url(image_url)?;
        validate_base_price(base_price)?;

        let mut product = Self {
            id: ProductId::new(),
            name,
            description,
            image_url,
            base_price,
            categories: Vec::new(),
            variants: Vec::new(),
            attributes: Vec::new(),
            revision: 0,
            events: Vec::new(),
        };

        product.events.push(CatalogEvent::ProductCreated(ProductCreated {
            product_id: product.id,
            name: product.name.clone(),
            occurred_at: Utc::now(),
        }));

        Ok(product)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn base_price(&self) -> Option<Decimal> {
        self.base_price
    }

    pub fn categories(&self) -> &[ProductCategory] {
        &self.categories
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn attributes(&self) -> &[ProductAttribute] {
        &self.attributes
    }

    pub fn update_basic_info(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        image_url: Option<String>,
    ) -> DomainResult<()> {
        self.name = validate_name(name.into())?;
        self.description = validate_description(description.into())?;
        self.image_url = validate_image_url(image_url)?;
        Ok(())
    }

    pub fn set_base_price(&mut self, base_price: Option<Decimal>) -> DomainResult<()> {
        validate_base_price(base_price)?;
        self.base_price = base_price;
        Ok(())
    }

    /// Idempotent by category id: adding an association that is already
    /// present leaves the existing one untouched.
    pub fn add_category(&mut self, category: ProductCategory) {
        if self.categories.contains(&category) {
            return;
        }
        self.categories.push(category);
    }

    pub fn remove_category(&mut self, category_id: &CategoryId) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c.category_id() != category_id);
        self.categories.len() != before
    }

    /// SKUs are unique within a product, compared case-insensitively.
    pub fn add_variant(&mut self, variant: Variant) -> DomainResult<()> {
        if self.has_sku(variant.sku()) {
            return Err(DomainError::invariant(format!(
                "variant with SKU '{}' already exists on this product",
                variant.sku()
            )));
        }
        self.variants.push(variant);
        Ok(())
    }

    pub fn remove_variant(&mut self, variant_id: &VariantId) -> bool {
        let before = self.variants.len();
        self.variants.retain(|v| v.id() != variant_id);
        self.variants.len() != before
    }

    pub fn find_variant(&self, variant_id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id() == variant_id)
    }

    pub fn find_variant_mut(&mut self, variant_id: &VariantId) -> Option<&mut Variant> {
        self.variants.iter_mut().find(|v| v.id() == variant_id)
    }

    pub fn variant_by_sku(&self, sku: &str) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|v| v.sku().eq_ignore_ascii_case(sku))
    }

    pub fn has_sku(&self, sku: &str) -> bool {
        self.variant_by_sku(sku).is_some()
    }

    pub fn sku_list(&self) -> Vec<&str> {
        self.variants.iter().map(Variant::sku).collect()
    }

    /// Attribute names are unique per product, compared case-insensitively.
    /// The attribute value plays no part in duplicate detection.
    pub fn add_attribute(&mut self, attribute: ProductAttribute) -> DomainResult<()> {
        if self
            .attributes
            .iter()
            .any(|a| a.normalized_name() == attribute.normalized_name())
        {
            return Err(DomainError::invariant(format!(
                "attribute '{}' already exists on this product",
                attribute.name()
            )));
        }
        self.attributes.push(attribute);
        Ok(())
    }

    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes
            .retain(|a| !a.name().eq_ignore_ascii_case(name));
        self.attributes.len() != before
    }

    /// Minimum price among active, in-stock variants; falls back to the base
    /// price, then to zero.
    pub fn effective_price(&self) -> Decimal {
        self.variants
            .iter()
            .filter(|v| v.is_in_stock())
            .map(Variant::price)
            .min()
            .or(self.base_price)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn is_in_stock(&self) -> bool {
        self.variants.iter().any(Variant::is_in_stock)
    }

    /// Total stock across active variants.
    pub fn total_stock(&self) -> u64 {
        self.variants
            .iter()
            .filter(|v| v.is_active())
            .map(|v| u64::from(v.stock_quantity()))
            .sum()
    }

    /// Events queued since creation or the last drain.
    pub fn pending_events(&self) -> &[CatalogEvent] {
        &self.events
    }

    /// Drain the queued domain events. Handlers call this strictly after the
    /// unit of work has committed.
    pub fn take_events(&mut self) -> Vec<CatalogEvent> {
        std::mem::take(&mut self.events)
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("product name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "product name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

fn validate_description(description: String) -> DomainResult<String> {
    let description = description.trim().to_string();
    if description.is_empty() {
        return Err(DomainError::validation(
            "product description cannot be empty",
        ));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DomainError::validation(format!(
            "product description cannot exceed {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(description)
}

fn validate_image_url(image_url: Option<String>) -> DomainResult<Option<String>> {
    match image_url {
        None => Ok(None),
        Some(url) => {
            let url = url.trim().to_string();
            if url.is_empty() {
                return Err(DomainError::validation(
                    "image url cannot be empty when provided",
                ));
            }
            if url.chars().count() > MAX_IMAGE_URL_LEN {
                return Err(DomainError::validation(format!(
                    "image url cannot exceed {MAX_IMAGE_URL_LEN} characters"
                )));
            }
            Ok(Some(url))
        }
    }
}

fn validate_base_price(base_price: Option<Decimal>) -> DomainResult<()> {
    if let Some(price) = base_price {
        if price < Decimal::ZERO {
            return Err(DomainError::validation("base price cannot be negative"));
        }
        if price > max_price() {
            return Err(DomainError::validation("base price cannot exceed 999999.99"));
        }
    }
    Ok(())
}
