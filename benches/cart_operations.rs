use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

use cart_rs::models::{AddToCartRequest, Cart, Product, RemoveFromCartRequest};
use cart_rs::repositories::{CartRepository, InMemoryCartRepository, InMemoryProductRepository};
use cart_rs::services::CartService;
use rust_decimal_macros::dec;

fn product_id(i: usize) -> String {
    format!("P{:04}", i)
}

/// Catalog of `size` products with effectively unlimited stock
fn catalog(size: usize) -> InMemoryProductRepository {
    InMemoryProductRepository::with_products((0..size).map(|i| {
        let mut product = Product::new(format!("Product {}", i), String::new(), dec!(4.50), u32::MAX / 2);
        product.id = product_id(i);
        product
    }))
}

fn service_with(size: usize) -> (CartService, InMemoryCartRepository) {
    let carts = InMemoryCartRepository::new();
    let service = CartService::new(Arc::new(carts.clone()), Arc::new(catalog(size)));
    (service, carts)
}

fn bench_add_and_remove(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (service, _) = service_with(100);

    c.bench_function("add_then_remove", |b| {
        b.to_async(&rt).iter(|| async {
            let add = AddToCartRequest {
                product_id: product_id(1),
                quantity: 2,
            };
            service.add_to_cart("bench-user", add).await.unwrap();

            let remove = RemoveFromCartRequest {
                product_id: product_id(1),
            };
            black_box(service.remove_from_cart("bench-user", remove).await.unwrap());
        })
    });
}

fn bench_get_populated_cart(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("get_cart");
    group.measurement_time(Duration::from_secs(5));

    for lines in [1usize, 10, 50] {
        let (service, carts) = service_with(lines);
        let mut cart = Cart::new("bench-user".to_string());
        for i in 0..lines {
            cart.add_item(product_id(i), 1);
        }
        rt.block_on(carts.save_cart(cart)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(service.get_cart("bench-user").await.unwrap()) })
        });
    }

    group.finish();
}

fn bench_cart_model(c: &mut Criterion) {
    c.bench_function("cart_add_item_merge", |b| {
        b.iter(|| {
            let mut cart = Cart::new("bench-user".to_string());
            for i in 0..20 {
                cart.add_item(product_id(i % 5), 1);
            }
            black_box(cart.total_items())
        })
    });
}

criterion_group!(
    benches,
    bench_add_and_remove,
    bench_get_populated_cart,
    bench_cart_model
);
criterion_main!(benches);
