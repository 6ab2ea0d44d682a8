// Repositories module - data access layer

pub mod cart_repository;
mod dynamodb;
pub mod memory;
pub mod product_repository;

pub use cart_repository::{CartRepository, DynamoDbCartRepository};
pub use memory::{InMemoryCartRepository, InMemoryProductRepository};
pub use product_repository::{DynamoDbProductRepository, ProductRepository};
