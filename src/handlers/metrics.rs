use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, instrument};

use crate::models::ApiResponse;
use crate::observability::Metrics;

/// Scrape endpoint. Encoding failures are reported in the API envelope.
#[instrument(name = "metrics_handler", skip(metrics))]
pub async fn metrics_handler(State(metrics): State<Arc<Metrics>>) -> Response {
    let text = match metrics.encode() {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::failure("Failed to encode metrics")),
            )
                .into_response();
        }
    };

    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static(prometheus::TEXT_FORMAT),
        )],
        text,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{create_cart_router, CartHandlerState};
    use crate::models::Product;
    use crate::repositories::{InMemoryCartRepository, InMemoryProductRepository};
    use crate::services::CartService;
    use axum::{
        body::Body,
        http::{Method, Request},
        routing::get,
        Router,
    };
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    fn cart_app(metrics: Arc<Metrics>) -> Router {
        let mut product = Product::new(
            "Filter Papers".to_string(),
            "Pack of 100".to_string(),
            dec!(4.25),
            10,
        );
        product.id = "P010".to_string();

        let state = CartHandlerState {
            cart_service: Arc::new(CartService::new(
                Arc::new(InMemoryCartRepository::new()),
                Arc::new(InMemoryProductRepository::with_products(vec![product])),
            )),
            metrics: metrics.clone(),
        };

        Router::new()
            .route("/metrics", get(metrics_handler))
            .with_state(metrics)
            .merge(create_cart_router(state))
    }

    async fn scrape(app: &Router) -> (StatusCode, String, String) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_scrape_reports_cart_outcomes() {
        let app = cart_app(Arc::new(Metrics::new().unwrap()));

        for quantity in [3, 50] {
            let request = Request::builder()
                .method(Method::POST)
                .uri("/api/cart/add")
                .header("x-user-id", "user123")
                .header("content-type", "application/json")
                .body(Body::from(format!(
                    r#"{{"productId":"P010","quantity":{}}}"#,
                    quantity
                )))
                .unwrap();
            app.clone().oneshot(request).await.unwrap();
        }

        let (status, content_type, text) = scrape(&app).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, prometheus::TEXT_FORMAT);
        assert!(text.contains("cart_operations_total{operation=\"add\",status=\"success\"} 1"));
        assert!(text.contains("cart_operations_total{operation=\"add\",status=\"error\"} 1"));
    }

    #[tokio::test]
    async fn test_scrape_before_any_cart_traffic() {
        let app = cart_app(Arc::new(Metrics::new().unwrap()));

        let (status, _, text) = scrape(&app).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!text.contains("operation=\"add\""));
    }
}
