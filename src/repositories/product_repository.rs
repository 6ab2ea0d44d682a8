use async_trait::async_trait;
use aws_sdk_dynamodb::operation::RequestId;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, Instrument};

use super::dynamodb::{
    dynamodb_span, map_dynamodb_error, optional_timestamp, required_number, required_string,
    required_timestamp,
};
use crate::models::{Product, RepositoryError, RepositoryResult};

/// Keyed lookup and persistence of products and their stock
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Find a product by its ID
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Product>>;

    /// Persist a product, replacing the stored record
    async fn save(&self, product: Product) -> RepositoryResult<Product>;
}

/// DynamoDB implementation of the ProductRepository trait
pub struct DynamoDbProductRepository {
    client: Arc<DynamoDbClient>,
    table_name: String,
    region: String,
}

impl DynamoDbProductRepository {
    /// Create a new DynamoDB product repository
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

    /// Convert a Product struct to DynamoDB attribute values
    pub fn product_to_item(&self, product: &Product) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();

        item.insert("id".to_string(), AttributeValue::S(product.id.clone()));
        item.insert("name".to_string(), AttributeValue::S(product.name.clone()));
        item.insert(
            "description".to_string(),
            AttributeValue::S(product.description.clone()),
        );
        item.insert(
            "price".to_string(),
            AttributeValue::N(product.price.to_string()),
        );
        item.insert(
            "quantity".to_string(),
            AttributeValue::N(product.quantity.to_string()),
        );
        item.insert(
            "created_at".to_string(),
            AttributeValue::S(product.created_at.to_rfc3339()),
        );
        item.insert(
            "updated_at".to_string(),
            AttributeValue::S(product.updated_at.to_rfc3339()),
        );

        item
    }

    /// Convert DynamoDB item to Product struct
    pub fn item_to_product(
        &self,
        item: HashMap<String, AttributeValue>,
    ) -> RepositoryResult<Product> {
        let id = required_string(&item, "id")?;
        let name = required_string(&item, "name")?;
        let description = item
            .get("description")
            .and_then(|v| v.as_s().ok())
            .cloned()
            .unwrap_or_default();

        let price = item
            .get("price")
            .and_then(|v| v.as_n().ok())
            .and_then(|s| Decimal::from_str(s).ok())
            .ok_or_else(|| RepositoryError::InvalidData {
                message: "Invalid price".to_string(),
            })?;

        let quantity = required_number(&item, "quantity")?;
        let created_at = required_timestamp(&item, "created_at")?;
        let updated_at = optional_timestamp(&item, "updated_at").unwrap_or(created_at);

        Ok(Product {
            id,
            name,
            description,
            price,
            quantity,
            created_at,
            updated_at,
        })
    }
}

#[async_trait]
impl ProductRepository for DynamoDbProductRepository {
    #[instrument(skip(self), fields(table = %self.table_name, id = %id))]
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Product>> {
        info!("Finding product by ID");

        let get_span = dynamodb_span("GetItem", &self.table_name, &self.region);

        let response = async {
            let result = self
                .client
                .get_item()
                .table_name(&self.table_name)
                .key("id", AttributeValue::S(id.to_string()))
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
                let product = self.item_to_product(item)?;
                info!("Product found with stock {}", product.quantity);
                Ok(Some(product))
            }
            None => {
                info!("Product not found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, product), fields(table = %self.table_name, id = %product.id, quantity = product.quantity))]
    async fn save(&self, product: Product) -> RepositoryResult<Product> {
        info!("Saving product");

        let item = self.product_to_item(&product);

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

        info!("Product saved successfully");
        Ok(product)
    }
}
