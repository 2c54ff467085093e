use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use shopforge_catalog::{Product, Variant, specs};
use shopforge_core::AggregateRoot;
use shopforge_infra::{InMemoryDocumentStore, UnitOfWork};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("benchmark runtime")
}

fn product_with_variants(n: usize, variant_count: usize) -> Product {
    let mut product = Product::create(
        format!("Product {n:04}"),
        "benchmark product",
        None,
        Some(Decimal::new(1999, 2)),
    )
    .expect("valid product");

    for i in 0..variant_count {
        let variant = Variant::new(
            format!("Variant {i}"),
            format!("SKU-{n}-{i}"),
            Decimal::new(2499, 2),
            5,
        )
        .expect("valid variant");
        product.add_variant(variant).expect("unique sku");
    }

    product
}

fn seeded_store(product_count: usize) -> Arc<InMemoryDocumentStore> {
    let rt = runtime();
    let store = Arc::new(InMemoryDocumentStore::new());
    rt.block_on(async {
        let cancel = CancellationToken::new();
        let uow = UnitOfWork::new(store.clone());
        let products = uow.products();
        for n in 0..product_count {
            products.add(&product_with_variants(n, 3)).expect("stage");
        }
        uow.save_changes(&cancel).await.expect("seed commit");
    });
    store
}

fn bench_commit_throughput(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("document_commit_throughput");

    for batch_size in [1usize, 10, 100] {
        group.throughput(Throughput::Elements(batch_size as u64));
        group.bench_with_input(
            BenchmarkId::new("insert_batch", batch_size),
            &batch_size,
            |b, &size| {
                let store = Arc::new(InMemoryDocumentStore::new());
                let cancel = CancellationToken::new();
                let mut n = 0usize;
                b.iter(|| {
                    rt.block_on(async {
                        let uow = UnitOfWork::new(store.clone());
                        let products = uow.products();
                        for _ in 0..size {
                            products.add(&product_with_variants(n, 3)).expect("stage");
                            n += 1;
                        }
                        uow.save_changes(&cancel).await.expect("commit");
                    });
                });
            },
        );
    }

    group.bench_function("load_update_save_round", |b| {
        let store = seeded_store(100);
        let cancel = CancellationToken::new();
        let id = rt.block_on(async {
            let uow = UnitOfWork::new(store.clone());
            let page = uow
                .get_paginated_by_spec(specs::products_listing(None), 1, 1, &cancel)
                .await
                .expect("page");
            *page.items[0].id()
        });

        b.iter(|| {
            rt.block_on(async {
                let uow = UnitOfWork::new(store.clone());
                let mut product = uow
                    .products()
                    .get_by_id(id, &cancel)
                    .await
                    .expect("load")
                    .expect("present");
                product
                    .update_basic_info(black_box("Updated name"), "benchmark product", None)
                    .expect("valid");
                uow.products().update(&product).expect("stage");
                uow.save_changes(&cancel).await.expect("commit");
            });
        });
    });

    group.finish();
}

fn bench_query_evaluation(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("document_query_evaluation");

    for product_count in [100usize, 1000] {
        let store = seeded_store(product_count);
        let cancel = CancellationToken::new();

        group.throughput(Throughput::Elements(product_count as u64));
        group.bench_with_input(
            BenchmarkId::new("listing_page", product_count),
            &product_count,
            |b, _| {
                b.iter(|| {
                    rt.block_on(async {
                        let uow = UnitOfWork::new(store.clone());
                        let page = uow
                            .get_paginated_by_spec(
                                specs::products_listing(None).untracked(),
                                2,
                                20,
                                &cancel,
                            )
                            .await
                            .expect("page");
                        black_box(page.items.len());
                    });
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("sku_existence_scan", product_count),
            &product_count,
            |b, _| {
                b.iter(|| {
                    rt.block_on(async {
                        let uow = UnitOfWork::new(store.clone());
                        let hit = uow
                            .products()
                            .exists_skus(&[format!("sku-{}-1", product_count / 2)], &cancel)
                            .await
                            .expect("scan");
                        black_box(hit);
                    });
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_commit_throughput, bench_query_evaluation);
criterion_main!(benches);
