use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopforge_core::{DomainError, DomainResult, Entity, VariantId};

use crate::attribute::ProductAttribute;

const MAX_NAME_LEN: usize = 200;
const MAX_SKU_LEN: usize = 50;
const MAX_STOCK: u32 = 999_999;

/// Upper price bound: 999,999.99.
pub(crate) fn max_price() -> Decimal {
    Decimal::new(99_999_999, 2)
}

/// A sellable variant of a product (entity, embedded in the product
/// document).
///
/// The SKU identifies the variant across the whole catalog; uniqueness inside
/// one product is enforced here and by [`crate::Product::add_variant`],
/// cross-product uniqueness is the create-product handler's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    id: VariantId,
    name: String,
    sku: String,
    price: Decimal,
    stock_quantity: u32,
    is_active: bool,
    attributes: Vec<ProductAttribute>,
}

impl Variant {
    pub fn new(
        name: impl Into<String>,
        sku: impl Into<String>,
        price: Decimal,
        stock_quantity: u32,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        let sku = sku.into().trim().to_string();

        if name.is_empty() {
            return Err(DomainError::validation("variant name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "variant name cannot exceed {MAX_NAME_LEN} characters"
            )));
        }
        validate_sku(&sku)?;
        validate_price(price)?;
        validate_stock(stock_quantity)?;

        Ok(Self {
            id: VariantId::new(),
            name,
            sku,
            price,
            stock_quantity,
            is_active: true,
            attributes: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn stock_quantity(&self) -> u32 {
        self.stock_quantity
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn attributes(&self) -> &[ProductAttribute] {
        &self.attributes
    }

    /// A variant counts as in stock only while it is active.
    pub fn is_in_stock(&self) -> bool {
        self.is_active && self.stock_quantity > 0
    }

    pub fn can_fulfill(&self, quantity: u32) -> bool {
        self.is_active && self.stock_quantity >= quantity
    }

    pub fn update_price(&mut self, price: Decimal) -> DomainResult<()> {
        validate_price(price)?;
        self.price = price;
        Ok(())
    }

    pub fn set_stock(&mut self, quantity: u32) -> DomainResult<()> {
        validate_stock(quantity)?;
        self.stock_quantity = quantity;
        Ok(())
    }

    pub fn add_stock(&mut self, quantity: u32) -> DomainResult<()> {
        let new_quantity = self
            .stock_quantity
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("stock quantity overflow"))?;
        validate_stock(new_quantity)?;
        self.stock_quantity = new_quantity;
        Ok(())
    }

    pub fn remove_stock(&mut self, quantity: u32) -> DomainResult<()> {
        if quantity > self.stock_quantity {
            return Err(DomainError::invariant(format!(
                "insufficient stock: requested {quantity}, available {}",
                self.stock_quantity
            )));
        }
        self.stock_quantity -= quantity;
        Ok(())
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Attribute names are unique per variant, compared case-insensitively.
    pub fn add_attribute(&mut self, attribute: ProductAttribute) -> DomainResult<()> {
        if self
            .attributes
            .iter()
            .any(|a| a.normalized_name() == attribute.normalized_name())
        {
            return Err(DomainError::invariant(format!(
                "attribute '{}' already exists on this variant",
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
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate_sku(sku: &str) -> DomainResult<()> {
    if sku.is_empty() {
        return Err(DomainError::validation("SKU cannot be empty"));
    }
    if sku.chars().count() > MAX_SKU_LEN {
        return Err(DomainError::validation(format!(
            "SKU cannot exceed {MAX_SKU_LEN} characters"
        )));
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(DomainError::validation(
            "SKU can only contain letters, numbers, hyphens, and underscores",
        ));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> DomainResult<()> {
    if price < Decimal::ZERO {
        return Err(DomainError::validation("variant price cannot be negative"));
    }
    if price > max_price() {
        return Err(DomainError::validation(
            "variant price cannot exceed 999999.99",
        ));
    }
    Ok(())
}

fn validate_stock(quantity: u32) -> DomainResult<()> {
    if quantity > MAX_STOCK {
        return Err(DomainError::validation(format!(
            "stock quantity cannot exceed {MAX_STOCK}"
        )));
    }
    Ok(())
}
