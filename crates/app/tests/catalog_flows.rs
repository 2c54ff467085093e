//! Tests: command handler -> unit of work -> document store -> query handler.
//!
//! Verifies:
//! - product creation persists the full aggregate and is queryable afterwards
//! - SKU uniqueness is enforced inside a request and across the catalog
//! - events are announced on the bus strictly after a successful save
//! - missing aggregates surface as `NotFound`, bad pages as `Validation`
//! - cancellation aborts a command before it reaches the store

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

use shopforge_app::commands::{
    AttributeInput, CreateCategoryCommand, CreateCategoryCommandHandler, CreateProductCommand,
    CreateProductCommandHandler, DeleteCategoryCommand, DeleteCategoryCommandHandler,
    DeleteProductCommand, DeleteProductCommandHandler, UpdateCategoryCommand,
    UpdateCategoryCommandHandler, UpdateProductCommand, UpdateProductCommandHandler, VariantInput,
};
use shopforge_app::queries::{
    GetCategoriesQuery, GetCategoriesQueryHandler, GetCategoryByIdQuery,
    GetCategoryByIdQueryHandler, GetProductByIdQuery, GetProductByIdQueryHandler,
    GetProductsQuery, GetProductsQueryHandler,
};
use shopforge_app::{AppError, CatalogEnvelope, spawn_logging_subscriber};
use shopforge_core::{CategoryId, ProductId};
use shopforge_events::{EventBus, InMemoryEventBus};
use shopforge_infra::{DocumentBackend, InMemoryDocumentStore};

type Bus = Arc<InMemoryEventBus<CatalogEnvelope>>;

fn store() -> Arc<InMemoryDocumentStore> {
    Arc::new(InMemoryDocumentStore::new())
}

fn backend(store: &Arc<InMemoryDocumentStore>) -> Arc<dyn DocumentBackend> {
    store.clone()
}

fn bus() -> Bus {
    Arc::new(InMemoryEventBus::new())
}

fn token() -> CancellationToken {
    CancellationToken::new()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn product_command(name: &str, sku: &str) -> CreateProductCommand {
    CreateProductCommand {
        name: name.to_string(),
        description: format!("{name} description"),
        image_url: None,
        base_price: None,
        category_ids: Vec::new(),
        variants: vec![VariantInput {
            name: "Standard".to_string(),
            sku: sku.to_string(),
            price: dec!(25.00),
            stock_quantity: 10,
            attributes: Vec::new(),
        }],
        attributes: Vec::new(),
    }
}

async fn seed_product(backend: &Arc<dyn DocumentBackend>, name: &str, sku: &str) -> ProductId {
    let handler = CreateProductCommandHandler::new(backend.clone(), bus());
    handler
        .handle(product_command(name, sku), &token())
        .await
        .expect("seed product")
}

#[tokio::test]
async fn creating_a_product_persists_the_full_aggregate() {
    let store = store();
    let backend = backend(&store);
    let apparel = CategoryId::new();

    let command = CreateProductCommand {
        name: "Field Jacket".to_string(),
        description: "Waxed cotton field jacket".to_string(),
        image_url: Some("https://cdn.example.com/jacket.png".to_string()),
        base_price: Some(dec!(180.00)),
        category_ids: vec![(apparel, "Apparel".to_string())],
        variants: vec![
            VariantInput {
                name: "Medium".to_string(),
                sku: "JKT-M".to_string(),
                price: dec!(189.00),
                stock_quantity: 4,
                attributes: Vec::new(),
            },
            VariantInput {
                name: "Large".to_string(),
                sku: "JKT-L".to_string(),
                price: dec!(195.00),
                stock_quantity: 0,
                attributes: vec![AttributeInput {
                    name: "Fit".to_string(),
                    value: "Relaxed".to_string(),
                }],
            },
        ],
        attributes: vec![AttributeInput {
            name: "Material".to_string(),
            value: "Waxed cotton".to_string(),
        }],
    };

    let handler = CreateProductCommandHandler::new(backend.clone(), bus());
    let product_id = handler.handle(command, &token()).await.expect("create");

    let details = GetProductByIdQueryHandler::new(backend.clone())
        .handle(GetProductByIdQuery { product_id }, &token())
        .await
        .expect("details");

    assert_eq!(details.name, "Field Jacket");
    assert_eq!(details.base_price, Some(dec!(180.00)));
    assert_eq!(details.effective_price, dec!(189.00));
    assert_eq!(details.variants.len(), 2);
    assert_eq!(details.categories.len(), 1);
    assert_eq!(details.categories[0].category_name, "Apparel");
    assert_eq!(details.attributes.len(), 1);
    assert_eq!(details.attributes[0].value, "Waxed cotton");
    assert!(details.in_stock);

    let large = details
        .variants
        .iter()
        .find(|variant| variant.sku == "JKT-L")
        .expect("large variant");
    assert_eq!(large.attributes[0].name, "Fit");
    assert!(!large.in_stock);
}

#[tokio::test]
async fn duplicate_skus_in_one_request_fail_before_touching_the_store() {
    let store = store();
    let backend = backend(&store);

    let mut command = product_command("Duplicate", "DUP-1");
    command.variants.push(VariantInput {
        name: "Second".to_string(),
        sku: "dup-1".to_string(),
        price: dec!(30.00),
        stock_quantity: 1,
        attributes: Vec::new(),
    });

    let handler = CreateProductCommandHandler::new(backend, bus());
    let err = handler.handle(command, &token()).await.unwrap_err();

    assert!(matches!(err, AppError::Domain(_)));
    assert!(
        err.to_string()
            .contains("duplicate SKUs found within product variants")
    );
    assert_eq!(store.document_count("catalog.product"), 0);
}

#[tokio::test]
async fn taken_skus_are_reported_in_the_submitted_spelling() {
    let store = store();
    let backend = backend(&store);
    seed_product(&backend, "First Widget", "WIDGET-1").await;

    let handler = CreateProductCommandHandler::new(backend, bus());
    let err = handler
        .handle(product_command("Second Widget", "widget-1"), &token())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Domain(_)));
    assert!(
        err.to_string()
            .contains("SKUs already exist in other products: widget-1")
    );
    assert_eq!(store.document_count("catalog.product"), 1);
}

#[tokio::test]
async fn creation_is_announced_only_after_a_successful_save() {
    init_tracing();
    let store = store();
    let backend = backend(&store);
    let bus = bus();
    let subscription = bus.subscribe();
    let _logger = spawn_logging_subscriber(&bus);
    let handler = CreateProductCommandHandler::new(backend, bus.clone());

    let mut duplicate = product_command("Broken", "SAME-1");
    duplicate.variants.push(VariantInput {
        name: "Clone".to_string(),
        sku: "SAME-1".to_string(),
        price: dec!(9.99),
        stock_quantity: 1,
        attributes: Vec::new(),
    });
    handler.handle(duplicate, &token()).await.unwrap_err();
    assert!(subscription.try_recv().is_err(), "failed save must not announce");

    let product_id = handler
        .handle(product_command("Canvas Tote", "TOTE-1"), &token())
        .await
        .expect("create");

    let envelope = subscription
        .recv_timeout(Duration::from_secs(1))
        .expect("announcement");
    assert_eq!(envelope.aggregate_type(), "catalog.product");
    assert_eq!(envelope.aggregate_id(), *product_id.as_uuid());
    assert_eq!(envelope.sequence_number(), 1);
    let payload = envelope
        .payload()
        .get("ProductCreated")
        .expect("tagged payload");
    assert_eq!(payload["name"], "Canvas Tote");
    assert!(subscription.try_recv().is_err(), "exactly one event per create");
}

#[tokio::test]
async fn updating_a_missing_product_reports_not_found() {
    let backend = backend(&store());
    let missing = ProductId::new();

    let err = UpdateProductCommandHandler::new(backend)
        .handle(
            UpdateProductCommand {
                product_id: missing,
                name: "Renamed".to_string(),
                description: "Renamed description".to_string(),
                image_url: None,
                base_price: None,
            },
            &token(),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("the product with id '{}' was not found", missing.as_uuid())
    );
}

#[tokio::test]
async fn updating_a_product_persists_the_new_details() {
    let store = store();
    let backend = backend(&store);
    let product_id = seed_product(&backend, "Plain Mug", "MUG-1").await;

    UpdateProductCommandHandler::new(backend.clone())
        .handle(
            UpdateProductCommand {
                product_id,
                name: "Enamel Mug".to_string(),
                description: "Enamel camping mug".to_string(),
                image_url: Some("https://cdn.example.com/mug.png".to_string()),
                base_price: Some(dec!(14.50)),
            },
            &token(),
        )
        .await
        .expect("update");

    let details = GetProductByIdQueryHandler::new(backend)
        .handle(GetProductByIdQuery { product_id }, &token())
        .await
        .expect("details");
    assert_eq!(details.name, "Enamel Mug");
    assert_eq!(details.base_price, Some(dec!(14.50)));
    assert_eq!(details.image_url.as_deref(), Some("https://cdn.example.com/mug.png"));
}

#[tokio::test]
async fn deleting_a_product_removes_its_document() {
    let store = store();
    let backend = backend(&store);
    let product_id = seed_product(&backend, "Short Lived", "GONE-1").await;

    DeleteProductCommandHandler::new(backend.clone())
        .handle(DeleteProductCommand { product_id }, &token())
        .await
        .expect("delete");

    let err = GetProductByIdQueryHandler::new(backend)
        .handle(GetProductByIdQuery { product_id }, &token())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(store.document_count("catalog.product"), 0);
}

#[tokio::test]
async fn product_listing_pages_and_filters_by_category() {
    let store = store();
    let backend = backend(&store);

    let mut alpha = product_command("Alpha Jacket", "ALP-1");
    alpha.category_ids = vec![(CategoryId::new(), "Apparel".to_string())];
    CreateProductCommandHandler::new(backend.clone(), bus())
        .handle(alpha, &token())
        .await
        .expect("seed alpha");
    seed_product(&backend, "Beta Mug", "BET-1").await;
    seed_product(&backend, "Gamma Lamp", "GAM-1").await;

    let handler = GetProductsQueryHandler::new(backend.clone());
    let page = handler
        .handle(
            GetProductsQuery {
                page_number: 1,
                page_size: 2,
                category_name: None,
            },
            &token(),
        )
        .await
        .expect("page");
    assert_eq!(page.total_count, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].name, "Alpha Jacket");
    assert_eq!(page.items[1].name, "Beta Mug");

    let filtered = handler
        .handle(
            GetProductsQuery {
                page_number: 1,
                page_size: 10,
                category_name: Some("Apparel".to_string()),
            },
            &token(),
        )
        .await
        .expect("filtered");
    assert_eq!(filtered.total_count, 1);
    assert_eq!(filtered.items[0].name, "Alpha Jacket");
    assert!(filtered.items[0].category_names.contains(&"Apparel".to_string()));
}

#[tokio::test]
async fn listing_page_bounds_are_validated() {
    let backend = backend(&store());
    let handler = GetProductsQueryHandler::new(backend);

    let err = handler
        .handle(
            GetProductsQuery {
                page_number: 0,
                page_size: 10,
                category_name: None,
            },
            &token(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = handler
        .handle(
            GetProductsQuery {
                page_number: 1,
                page_size: 101,
                category_name: None,
            },
            &token(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn sub_categories_require_an_existing_parent() {
    let store = store();
    let backend = backend(&store);
    let bus = bus();
    let subscription = bus.subscribe();
    let handler = CreateCategoryCommandHandler::new(backend.clone(), bus.clone());

    let orphan_parent = CategoryId::new();
    let err = handler
        .handle(
            CreateCategoryCommand {
                name: "Jackets".to_string(),
                description: String::new(),
                parent_category_id: Some(orphan_parent),
            },
            &token(),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "the category with id '{}' was not found",
            orphan_parent.as_uuid()
        )
    );
    assert!(subscription.try_recv().is_err());

    let parent_id = handler
        .handle(
            CreateCategoryCommand {
                name: "Apparel".to_string(),
                description: "Clothing".to_string(),
                parent_category_id: None,
            },
            &token(),
        )
        .await
        .expect("create root");
    let child_id = handler
        .handle(
            CreateCategoryCommand {
                name: "Jackets".to_string(),
                description: String::new(),
                parent_category_id: Some(parent_id),
            },
            &token(),
        )
        .await
        .expect("create sub");
    assert_ne!(parent_id, child_id);

    let envelope = subscription
        .recv_timeout(Duration::from_secs(1))
        .expect("root announcement");
    assert_eq!(envelope.aggregate_type(), "catalog.category");
    assert_eq!(envelope.aggregate_id(), *parent_id.as_uuid());
    assert_eq!(envelope.sequence_number(), 1);
}

#[tokio::test]
async fn category_listing_can_be_restricted_to_roots() {
    let store = store();
    let backend = backend(&store);
    let handler = CreateCategoryCommandHandler::new(backend.clone(), bus());

    let parent_id = handler
        .handle(
            CreateCategoryCommand {
                name: "Home".to_string(),
                description: String::new(),
                parent_category_id: None,
            },
            &token(),
        )
        .await
        .expect("root");
    handler
        .handle(
            CreateCategoryCommand {
                name: "Lighting".to_string(),
                description: String::new(),
                parent_category_id: Some(parent_id),
            },
            &token(),
        )
        .await
        .expect("sub");

    let query_handler = GetCategoriesQueryHandler::new(backend);
    let all = query_handler
        .handle(
            GetCategoriesQuery {
                page_number: 1,
                page_size: 10,
                root_only: false,
                active_only: false,
            },
            &token(),
        )
        .await
        .expect("all");
    assert_eq!(all.total_count, 2);

    let roots = query_handler
        .handle(
            GetCategoriesQuery {
                page_number: 1,
                page_size: 10,
                root_only: true,
                active_only: false,
            },
            &token(),
        )
        .await
        .expect("roots");
    assert_eq!(roots.total_count, 1);
    assert_eq!(roots.items[0].name, "Home");
    assert!(roots.items[0].is_root);
}

#[tokio::test]
async fn updating_a_category_is_visible_through_get_by_id() {
    let store = store();
    let backend = backend(&store);

    let category_id = CreateCategoryCommandHandler::new(backend.clone(), bus())
        .handle(
            CreateCategoryCommand {
                name: "Outdoors".to_string(),
                description: String::new(),
                parent_category_id: None,
            },
            &token(),
        )
        .await
        .expect("create");

    UpdateCategoryCommandHandler::new(backend.clone())
        .handle(
            UpdateCategoryCommand {
                category_id,
                name: "Outdoor Gear".to_string(),
                description: "Tents, packs, stoves".to_string(),
            },
            &token(),
        )
        .await
        .expect("update");

    let query_handler = GetCategoryByIdQueryHandler::new(backend);
    let category = query_handler
        .handle(GetCategoryByIdQuery { category_id }, &token())
        .await
        .expect("get");
    assert_eq!(category.name, "Outdoor Gear");
    assert_eq!(category.description, "Tents, packs, stoves");
    assert!(category.is_root);

    let err = query_handler
        .handle(
            GetCategoryByIdQuery {
                category_id: CategoryId::new(),
            },
            &token(),
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn deleting_a_missing_category_is_a_noop() {
    let backend = backend(&store());

    DeleteCategoryCommandHandler::new(backend)
        .handle(
            DeleteCategoryCommand {
                category_id: CategoryId::new(),
            },
            &token(),
        )
        .await
        .expect("delete of a missing category succeeds");
}

#[tokio::test]
async fn a_cancelled_token_aborts_the_command() {
    let store = store();
    let backend = backend(&store);
    let cancel = token();
    cancel.cancel();

    let err = CreateProductCommandHandler::new(backend, bus())
        .handle(product_command("Never Saved", "NOPE-1"), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Cancelled));
    assert_eq!(store.document_count("catalog.product"), 0);
}
