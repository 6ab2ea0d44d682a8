use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, ServerConfig, StorageBackend};
use crate::handlers::{
    cors_layer, create_cart_router, health_check, metrics_handler, request_validation_middleware,
    security_headers_middleware, timeout_response_middleware, CartHandlerState,
};
use crate::models::RepositoryResult;
use crate::observability::{observability_middleware, Metrics};
use crate::repositories::{
    CartRepository, DynamoDbCartRepository, DynamoDbProductRepository, InMemoryCartRepository,
    InMemoryProductRepository, ProductRepository,
};
use crate::services::CartService;

/// Build the cart service on top of the configured storage backend
pub async fn build_cart_service(database: &DatabaseConfig) -> RepositoryResult<CartService> {
    let cart_repository: Arc<dyn CartRepository>;
    let product_repository: Arc<dyn ProductRepository>;

    match database.storage_backend {
        StorageBackend::Dynamodb => {
            let client = Arc::new(database.dynamodb_client().await);
            info!(
                "Using DynamoDB tables: carts={}, products={}",
                database.carts_table_name, database.products_table_name
            );
            cart_repository = Arc::new(DynamoDbCartRepository::new(
                client.clone(),
                database.carts_table_name.clone(),
                database.region.clone(),
            ));
            product_repository = Arc::new(DynamoDbProductRepository::new(
                client,
                database.products_table_name.clone(),
                database.region.clone(),
            ));
        }
        StorageBackend::Memory => {
            let products = match &database.seed_file {
                Some(path) => InMemoryProductRepository::from_seed_file(path)?,
                None => {
                    warn!("In-memory storage without a seed file, product catalog is empty");
                    InMemoryProductRepository::new()
                }
            };
            info!("Using in-memory storage");
            cart_repository = Arc::new(InMemoryCartRepository::new());
            product_repository = Arc::new(products);
        }
    }

    Ok(CartService::new(cart_repository, product_repository))
}

/// Assemble the HTTP application: cart API, health and metrics endpoints, and
/// the middleware stack
pub fn create_app(
    cart_service: Arc<CartService>,
    metrics: Arc<Metrics>,
    server: &ServerConfig,
) -> Router {
    let metrics_for_middleware = metrics.clone();
    let max_request_size = server.max_request_size;

    let cart_state = CartHandlerState {
        cart_service,
        metrics: metrics.clone(),
    };

    Router::new()
        .route("/health/status", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
        .merge(create_cart_router(cart_state))
        // Layers wrap everything added before them, so the last one runs first
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(middleware::from_fn(timeout_response_middleware))
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
        .layer(middleware::from_fn(move |req, next| {
            request_validation_middleware(max_request_size, req, next)
        }))
        .layer(cors_layer())
        .layer(middleware::from_fn(security_headers_middleware))
}
