use async_trait::async_trait;
use aws_sdk_dynamodb::operation::RequestId;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, Instrument};

use super::dynamodb::{
    dynamodb_span, map_dynamodb_error, optional_timestamp, required_number, required_string,
    required_timestamp,
};
use crate::models::{Cart, CartItem, RepositoryError, RepositoryResult};

/// Keyed lookup and persistence of one cart per user
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Find the cart belonging to a user
    async fn find_cart(&self, user_id: &str) -> RepositoryResult<Option<Cart>>;

    /// Save a cart (create or replace)
    async fn save_cart(&self, cart: Cart) -> RepositoryResult<Cart>;
}

/// DynamoDB implementation of the CartRepository trait
pub struct DynamoDbCartRepository {
    client: Arc<DynamoDbClient>,
    table_name: String,
    region: String,
}

impl DynamoDbCartRepository {
    /// Create a new DynamoDB cart repository
    pub fn new(client: Arc<DynamoDbClient>, table_name: String, region: String) -> Self {
        Self {
            client,
            table_name,
            region,
        }
    }

    /// Get the table name (for testing)
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Convert a Cart struct to DynamoDB attribute values
    pub fn cart_to_item(&self, cart: &Cart) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();

        item.insert(
            "user_id".to_string(),
            AttributeValue::S(cart.user_id.clone()),
        );

        let items: Vec<AttributeValue> = cart
            .items
            .iter()
            .map(|cart_item| {
                let mut item_map = HashMap::new();
                item_map.insert(
                    "product_id".to_string(),
                    AttributeValue::S(cart_item.product_id.clone()),
                );
                item_map.insert(
                    "quantity".to_string(),
                    AttributeValue::N(cart_item.quantity.to_string()),
                );
                AttributeValue::M(item_map)
            })
            .collect();

        item.insert("items".to_string(), AttributeValue::L(items));
        item.insert(
            "created_at".to_string(),
            AttributeValue::S(cart.created_at.to_rfc3339()),
        );
        item.insert(
            "updated_at".to_string(),
            AttributeValue::S(cart.updated_at.to_rfc3339()),
        );

        item
    }

    /// Convert DynamoDB item to Cart struct
    pub fn item_to_cart(&self, item: HashMap<String, AttributeValue>) -> RepositoryResult<Cart> {
        let user_id = required_string(&item, "user_id")?;

        // Malformed lines fail the whole read
        let items = match item.get("items").and_then(|v| v.as_l().ok()) {
            Some(list) => list
                .iter()
                .map(|attr| {
                    attr.as_m()
                        .map_err(|_| RepositoryError::InvalidData {
                            message: "Cart item is not a map".to_string(),
                        })
                        .and_then(|item_map| self.map_to_cart_item(item_map))
                })
                .collect::<RepositoryResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        let created_at = required_timestamp(&item, "created_at")?;
        // Legacy records may lack updated_at
        let updated_at = optional_timestamp(&item, "updated_at").unwrap_or(created_at);

        Ok(Cart {
            user_id,
            items,
            created_at,
            updated_at,
        })
    }

    /// Convert DynamoDB map to CartItem
    pub fn map_to_cart_item(
        &self,
        item_map: &HashMap<String, AttributeValue>,
    ) -> RepositoryResult<CartItem> {
        let product_id = required_string(item_map, "product_id")?;
        let quantity = required_number(item_map, "quantity")?;

        Ok(CartItem {
            product_id,
            quantity,
        })
    }
}

#[async_trait]
impl CartRepository for DynamoDbCartRepository {
    #[instrument(skip(self), fields(table = %self.table_name, user_id = %user_id))]
    async fn find_cart(&self, user_id: &str) -> RepositoryResult<Option<Cart>> {
        info!("Finding cart for user");

        let get_span = dynamodb_span("GetItem", &self.table_name, &self.region);

        let response = async {
            let result = self
                .client
                .get_item()
                .table_name(&self.table_name)
                .key("user_id", AttributeValue::S(user_id.to_string()))
                .consistent_read(true)
                .send()
                .await;

            match &result {
                Ok(output) => {
                    tracing::Span::current().record("http.status_code", 200);
                    if let Some(request_id) = output.request_id() {
                        tracing::Span::current().record("aws.request_id", request_id);
                    }
                }
                Err(e) => {
                    tracing::Span::current().record("http.status_code", 400);
                    error!("DynamoDB GetItem failed: {}", e);
                }
            }

            result.map_err(|e| map_dynamodb_error(e.into(), &self.table_name))
        }
        .instrument(get_span)
        .await?;

        match response.item {
            Some(item) => {
                let cart = self.item_to_cart(item)?;
                info!("Cart found with {} items", cart.items.len());
                Ok(Some(cart))
            }
            None => {
                info!("Cart not found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, cart), fields(table = %self.table_name, user_id = %cart.user_id, item_count = cart.items.len()))]
    async fn save_cart(&self, cart: Cart) -> RepositoryResult<Cart> {
        info!("Saving cart");

        let item = self.cart_to_item(&cart);

        let put_span = dynamodb_span("PutItem", &self.table_name, &self.region);

        async {
            self.client
                .put_item()
                .table_name(&self.table_name)
                .set_item(Some(item))
                .send()
                .await
                .map_err(|e| map_dynamodb_error(e.into(), &self.table_name))
        }
        .instrument(put_span)
        .await?;

        info!("Cart saved successfully");
        Ok(cart)
    }
}
