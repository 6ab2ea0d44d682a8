use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog product with its available stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    /// Units available for sale
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a new product with a generated id
    pub fn new(name: String, description: String, price: Decimal, quantity: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            price,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether `requested` units can be taken from stock
    pub fn has_stock_for(&self, requested: u32) -> bool {
        self.quantity >= requested
    }

    /// Remove units from stock. Callers check `has_stock_for` first.
    pub fn take_stock(&mut self, amount: u32) {
        self.quantity = self.quantity.saturating_sub(amount);
        self.updated_at = Utc::now();
    }

    /// Put units back into stock
    pub fn return_stock(&mut self, amount: u32) {
        self.quantity = self.quantity.saturating_add(amount);
        self.updated_at = Utc::now();
    }
}
