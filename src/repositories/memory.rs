use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use super::{CartRepository, ProductRepository};
use crate::models::{Cart, Product, RepositoryError, RepositoryResult};

/// Process-local cart store keyed by user id
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartRepository {
    carts: Arc<RwLock<HashMap<String, Cart>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored carts
    pub async fn len(&self) -> usize {
        self.carts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.carts.read().await.is_empty()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    #[instrument(skip(self))]
    async fn find_cart(&self, user_id: &str) -> RepositoryResult<Option<Cart>> {
        let carts = self.carts.read().await;
        let cart = carts.get(user_id).cloned();
        debug!(found = cart.is_some(), "Looked up cart in memory");
        Ok(cart)
    }

    #[instrument(skip(self, cart), fields(user_id = %cart.user_id))]
    async fn save_cart(&self, cart: Cart) -> RepositoryResult<Cart> {
        let mut carts = self.carts.write().await;
        carts.insert(cart.user_id.clone(), cart.clone());
        debug!("Stored cart in memory");
        Ok(cart)
    }
}

/// Process-local product store keyed by product id
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<String, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given products
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products
            .into_iter()
            .map(|product| (product.id.clone(), product))
            .collect();
        Self {
            products: Arc::new(RwLock::new(products)),
        }
    }

    /// Load a JSON array of products from disk
    pub fn from_seed_file(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| RepositoryError::InvalidData {
            message: format!("Failed to read seed file {}: {}", path.display(), e),
        })?;
        let products: Vec<Product> = serde_json::from_str(&raw)?;
        info!(
            "Seeded {} products from {}",
            products.len(),
            path.display()
        );
        Ok(Self::with_products(products))
    }

    /// Remove a product, as if it had been deleted from the catalog
    pub async fn remove(&self, id: &str) -> Option<Product> {
        self.products.write().await.remove(id)
    }

    /// Current stock of a product, if it exists
    pub async fn stock_of(&self, id: &str) -> Option<u32> {
        self.products.read().await.get(id).map(|p| p.quantity)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(id).cloned())
    }

    #[instrument(skip(self, product), fields(id = %product.id, quantity = product.quantity))]
    async fn save(&self, product: Product) -> RepositoryResult<Product> {
        let mut products = self.products.write().await;
        products.insert(product.id.clone(), product.clone());
        Ok(product)
    }
}
