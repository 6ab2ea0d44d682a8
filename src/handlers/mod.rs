pub mod auth;
pub mod cart;
pub mod health;
pub mod metrics;
pub mod middleware;

pub use auth::{AuthenticatedUser, USER_ID_HEADER};
pub use cart::{create_cart_router, CartHandlerState, CartOperation};
pub use health::health_check;
pub use metrics::metrics_handler;
pub use middleware::{
    cors_layer, request_validation_middleware, security_headers_middleware,
    timeout_response_middleware,
};
