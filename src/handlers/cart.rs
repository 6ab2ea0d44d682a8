use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::auth::AuthenticatedUser;
use crate::models::{
    AddToCartRequest, ApiResponse, Cart, ErrorKind, PopulatedCart, RemoveFromCartRequest, ServiceError,
    ServiceResult, UpdateCartItemRequest,
};
use crate::observability::Metrics;
use crate::services::CartService;

type ErrorResponse = (StatusCode, Json<ApiResponse<()>>);
type HandlerResult<T> = Result<Json<ApiResponse<T>>, ErrorResponse>;

/// State for cart handlers
#[derive(Clone)]
pub struct CartHandlerState {
    pub cart_service: Arc<CartService>,
    pub metrics: Arc<Metrics>,
}

/// The cart endpoints, used for metric labels and fallback error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Get,
    Add,
    Update,
    Remove,
    Clear,
}

impl CartOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartOperation::Get => "get",
            CartOperation::Add => "add",
            CartOperation::Update => "update",
            CartOperation::Remove => "remove",
            CartOperation::Clear => "clear",
        }
    }

    /// Message returned when the operation fails for an unexpected reason
    pub fn failure_message(&self) -> &'static str {
        match self {
            CartOperation::Get => "Failed to get cart",
            CartOperation::Add => "Failed to add to cart",
            CartOperation::Update => "Failed to update cart item",
            CartOperation::Remove => "Failed to remove from cart",
            CartOperation::Clear => "Failed to clear cart",
        }
    }
}

/// Create cart router with all endpoints
pub fn create_cart_router(state: CartHandlerState) -> Router {
    Router::new()
        .route("/api/cart", get(get_cart))
        .route("/api/cart/add", post(add_to_cart))
        .route("/api/cart/update", put(update_cart_item))
        .route("/api/cart/remove", delete(remove_from_cart))
        .route("/api/cart/clear", delete(clear_cart))
        .with_state(state)
}

/// Get the caller's cart with product details
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_cart(
    State(state): State<CartHandlerState>,
    user: AuthenticatedUser,
) -> HandlerResult<Option<PopulatedCart>> {
    let result = state.cart_service.get_cart(&user.user_id).await;
    respond(&state, CartOperation::Get, result)
}

/// Add a product to the caller's cart
#[instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn add_to_cart(
    State(state): State<CartHandlerState>,
    user: AuthenticatedUser,
    payload: Result<Json<AddToCartRequest>, JsonRejection>,
) -> HandlerResult<Cart> {
    let Json(request) = parse_body(&state, CartOperation::Add, payload)?;

    info!(
        "Adding item to cart: product_id={}, quantity={}",
        request.product_id, request.quantity
    );

    let result = state.cart_service.add_to_cart(&user.user_id, request).await;
    respond(&state, CartOperation::Add, result)
}

/// Change the quantity of a line in the caller's cart
#[instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn update_cart_item(
    State(state): State<CartHandlerState>,
    user: AuthenticatedUser,
    payload: Result<Json<UpdateCartItemRequest>, JsonRejection>,
) -> HandlerResult<Cart> {
    let Json(request) = parse_body(&state, CartOperation::Update, payload)?;

    info!(
        "Updating cart item: product_id={}, quantity={}",
        request.product_id, request.quantity
    );

    let result = state
        .cart_service
        .update_cart_item(&user.user_id, request)
        .await;
    respond(&state, CartOperation::Update, result)
}

/// Remove a line from the caller's cart
#[instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn remove_from_cart(
    State(state): State<CartHandlerState>,
    user: AuthenticatedUser,
    payload: Result<Json<RemoveFromCartRequest>, JsonRejection>,
) -> HandlerResult<Cart> {
    let Json(request) = parse_body(&state, CartOperation::Remove, payload)?;

    info!("Removing item from cart: product_id={}", request.product_id);

    let result = state
        .cart_service
        .remove_from_cart(&user.user_id, request)
        .await;
    respond(&state, CartOperation::Remove, result)
}

/// Empty the caller's cart
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn clear_cart(
    State(state): State<CartHandlerState>,
    user: AuthenticatedUser,
) -> HandlerResult<Cart> {
    let result = state.cart_service.clear_cart(&user.user_id).await;
    respond(&state, CartOperation::Clear, result)
}

fn parse_body<T>(
    state: &CartHandlerState,
    operation: CartOperation,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<Json<T>, ErrorResponse> {
    payload.map_err(|rejection| {
        warn!("Rejected {} request body: {}", operation.as_str(), rejection);
        state.metrics.record_cart_operation(operation.as_str(), false);
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::failure(rejection.body_text())),
        )
    })
}

fn respond<T>(
    state: &CartHandlerState,
    operation: CartOperation,
    result: ServiceResult<T>,
) -> HandlerResult<T> {
    state
        .metrics
        .record_cart_operation(operation.as_str(), result.is_ok());

    match result {
        Ok(data) => Ok(Json(ApiResponse::ok(data))),
        Err(err) => Err(service_error_to_response(operation, err)),
    }
}

/// Convert ServiceError to HTTP response
pub fn service_error_to_response(operation: CartOperation, err: ServiceError) -> ErrorResponse {
    let status = match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = match &err {
        ServiceError::ProductNotFound { .. } => "Product not found".to_string(),
        ServiceError::CartNotFound { .. } => "Cart not found".to_string(),
        ServiceError::CartItemNotFound { .. } => "Item not found".to_string(),
        ServiceError::InsufficientStock { .. } => "Not enough stock available".to_string(),
        ServiceError::ValidationError { message } => message.clone(),
        ServiceError::Repository { .. } => operation.failure_message().to_string(),
    };

    if status.is_server_error() {
        error!("Cart {} failed: {}", operation.as_str(), err);
    } else {
        warn!("Cart {} rejected: {}", operation.as_str(), err);
    }

    (status, Json(ApiResponse::failure(message)))
}
