// Services module - business logic layer

pub mod cart_service;

pub use cart_service::CartService;
