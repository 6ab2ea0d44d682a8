use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Product;

/// Shopping cart for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub user_id: String,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Individual line item in a shopping cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

/// Cart with every line resolved to its product record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedCart {
    pub user_id: String,
    pub items: Vec<PopulatedCartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cart line with its product, `None` when the product no longer exists
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedCartItem {
    pub product_id: String,
    pub product: Option<Product>,
    pub quantity: u32,
}

/// Request model for adding a product to the cart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: u32,
}

/// Request model for setting the quantity of a cart line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

/// Request model for removing a cart line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub product_id: String,
}

impl Cart {
    /// Create a new empty cart for a user
    pub fn new(user_id: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Find the line for a product
    pub fn find_item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.is_for(product_id))
    }

    /// Find the line for a product, mutably
    pub fn find_item_mut(&mut self, product_id: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.is_for(product_id))
    }

    /// Check if a product already has a line in the cart
    pub fn contains_item(&self, product_id: &str) -> bool {
        self.items.iter().any(|item| item.is_for(product_id))
    }

    /// Add to an existing line or append a new one
    pub fn add_item(&mut self, product_id: String, quantity: u32) {
        if let Some(existing_item) = self.find_item_mut(&product_id) {
            existing_item.quantity = existing_item.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartItem::new(product_id, quantity));
        }
        self.touch();
    }

    /// Overwrite the quantity of a line. Returns false if the line is missing.
    pub fn set_item_quantity(&mut self, product_id: &str, quantity: u32) -> bool {
        match self.find_item_mut(product_id) {
            Some(item) => {
                item.quantity = quantity;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Drop the line for a product, returning it if it was present
    pub fn remove_item(&mut self, product_id: &str) -> Option<CartItem> {
        let position = self.items.iter().position(|item| item.is_for(product_id))?;
        let removed = self.items.remove(position);
        self.touch();
        Some(removed)
    }

    /// Empty the cart, returning the lines that were in it
    pub fn clear(&mut self) -> Vec<CartItem> {
        let drained = std::mem::take(&mut self.items);
        self.touch();
        drained
    }

    /// Total number of units across all lines
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl CartItem {
    pub fn new(product_id: String, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }

    /// Line lookup predicate: exact match on product id
    pub fn is_for(&self, product_id: &str) -> bool {
        self.product_id == product_id
    }
}
