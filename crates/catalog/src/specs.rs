//! Named specifications for the catalog.
//!
//! Constructor functions returning configured [`Specification`]s; repositories
//! and query handlers compose these with paging. Listings order by
//! lower-cased name so paging windows are deterministic.

use std::collections::HashSet;

use shopforge_core::{AggregateRoot, CategoryId, ProductId, Specification};

use crate::category::Category;
use crate::product::Product;

pub fn product_by_id(id: ProductId) -> Specification<Product> {
    Specification::new().filter(move |p: &Product| *p.id() == id)
}

/// Products whose name contains `term`, case-insensitive.
pub fn products_by_name(term: &str) -> Specification<Product> {
    let needle = term.to_lowercase();
    Specification::new()
        .filter(move |p: &Product| p.name().to_lowercase().contains(&needle))
        .order_by(|p: &Product| p.name().to_lowercase())
}

pub fn products_by_category(category_id: CategoryId) -> Specification<Product> {
    Specification::new()
        .filter(move |p: &Product| {
            p.categories()
                .iter()
                .any(|c| *c.category_id() == category_id)
        })
        .order_by(|p: &Product| p.name().to_lowercase())
}

/// Products with at least one active variant holding stock.
pub fn products_in_stock() -> Specification<Product> {
    Specification::new()
        .filter(|p: &Product| p.is_in_stock())
        .order_by(|p: &Product| p.name().to_lowercase())
}

/// Full-text-ish search over name and description, case-insensitive,
/// optionally narrowed to products attached to one category.
pub fn products_search(term: &str, category_id: Option<CategoryId>) -> Specification<Product> {
    let needle = term.to_lowercase();
    Specification::new()
        .filter(move |p: &Product| {
            let text_hit = p.name().to_lowercase().contains(&needle)
                || p.description().to_lowercase().contains(&needle);
            let category_hit =
                category_id.is_none_or(|id| p.categories().iter().any(|c| *c.category_id() == id));
            text_hit && category_hit
        })
        .order_by(|p: &Product| p.name().to_lowercase())
}

/// Products carrying any of the given SKUs, compared case-insensitively.
pub fn products_with_skus(skus: &[String]) -> Specification<Product> {
    let wanted: HashSet<String> = skus.iter().map(|s| s.to_lowercase()).collect();
    Specification::new().filter(move |p: &Product| {
        p.variants()
            .iter()
            .any(|v| wanted.contains(&v.sku().to_lowercase()))
    })
}

/// The product listing page: optionally narrowed to products attached to a
/// category whose name contains `category_name`, case-insensitive.
pub fn products_listing(category_name: Option<&str>) -> Specification<Product> {
    let spec = Specification::new().order_by(|p: &Product| p.name().to_lowercase());
    match category_name {
        Some(term) => {
            let needle = term.to_lowercase();
            spec.filter(move |p: &Product| {
                p.categories()
                    .iter()
                    .any(|c| c.category_name().to_lowercase().contains(&needle))
            })
        }
        None => spec,
    }
}

pub fn category_by_id(id: CategoryId) -> Specification<Category> {
    Specification::new().filter(move |c: &Category| *c.id() == id)
}

/// The category listing page, optionally restricted to roots and/or active
/// categories.
pub fn categories_listing(root_only: bool, active_only: bool) -> Specification<Category> {
    Specification::new()
        .filter(move |c: &Category| {
            (!root_only || c.is_root()) && (!active_only || c.is_active())
        })
        .order_by(|c: &Category| c.name().to_lowercase())
}
