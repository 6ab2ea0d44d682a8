use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use cart_rs::models::Product;
use cart_rs::repositories::{InMemoryCartRepository, InMemoryProductRepository};
use cart_rs::services::CartService;
use cart_rs::{create_app, Config, Metrics};
use reqwest::Client;
use rust_decimal_macros::dec;
use serde_json::Value;
use tokio::net::TcpListener;

pub const USER_ID_HEADER: &str = "x-user-id";

/// A running cart service on an ephemeral port, backed by in-memory stores
pub struct TestEnvironment {
    pub client: Client,
    pub base_url: String,
    pub products: InMemoryProductRepository,
    pub carts: InMemoryCartRepository,
}

pub fn test_product(id: &str, name: &str, stock: u32) -> Product {
    let mut product = Product::new(name.to_string(), String::new(), dec!(9.99), stock);
    product.id = id.to_string();
    product
}

impl TestEnvironment {
    /// Start a server with the standard catalog:
    /// P001 (stock 7), P002 (stock 20), P003 (stock 0)
    pub async fn new() -> Self {
        Self::with_products(vec![
            test_product("P001", "House Blend", 7),
            test_product("P002", "Paper Filters", 20),
            test_product("P003", "Limited Reserve", 0),
        ])
        .await
    }

    pub async fn with_products(products: Vec<Product>) -> Self {
        let carts = InMemoryCartRepository::new();
        let products = InMemoryProductRepository::with_products(products);
        let cart_service = CartService::new(Arc::new(carts.clone()), Arc::new(products.clone()));

        let config = Config::from_map(HashMap::new()).expect("Failed to load test config");
        let app = create_app(
            Arc::new(cart_service),
            Arc::new(Metrics::new().expect("Failed to create metrics")),
            &config.server,
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local address");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to serve app");
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            client: Client::new(),
            base_url,
            products,
            carts,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request as `user_id` and return the status with the parsed envelope
    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        user_id: &str,
        body: Option<Value>,
    ) -> (u16, Value) {
        let mut request = self
            .client
            .request(method, self.url(path))
            .header(USER_ID_HEADER, user_id);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.expect("Failed to send request");
        let status = response.status().as_u16();
        let body = response.json().await.expect("Failed to parse response");
        (status, body)
    }

    pub async fn stock_of(&self, product_id: &str) -> Option<u32> {
        self.products.stock_of(product_id).await
    }
}
