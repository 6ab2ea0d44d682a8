use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

use super::auth::USER_ID_HEADER;
use crate::models::ApiResponse;

/// Reject bodies that are not JSON or exceed `max_request_size` bytes
pub async fn request_validation_middleware(
    max_request_size: usize,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Err(rejection) = validate_content_type(&request) {
        return rejection.into_response();
    }

    if let Err(rejection) = validate_request_size(&request, max_request_size) {
        return rejection.into_response();
    }

    next.run(request).await
}

type Rejection = (StatusCode, Json<ApiResponse<()>>);

fn validate_content_type(request: &Request<Body>) -> Result<(), Rejection> {
    let method = request.method();

    if method == Method::POST || method == Method::PUT || method == Method::PATCH {
        match request.headers().get(header::CONTENT_TYPE) {
            Some(content_type) => {
                let content_type_str = content_type.to_str().unwrap_or("");
                if !content_type_str.starts_with("application/json") {
                    warn!("Invalid content type: {}", content_type_str);
                    return Err((
                        StatusCode::UNSUPPORTED_MEDIA_TYPE,
                        Json(ApiResponse::failure("Content-Type must be application/json")),
                    ));
                }
            }
            None => {
                warn!("Missing content type header");
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::failure(
                        "Content-Type header is required for requests with body",
                    )),
                ));
            }
        }
    }

    Ok(())
}

fn validate_request_size(request: &Request<Body>, max_request_size: usize) -> Result<(), Rejection> {
    let length = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());

    if let Some(length) = length {
        if length > max_request_size {
            error!("Request too large: {} bytes", length);
            return Err((
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ApiResponse::failure(format!(
                    "Request size {} bytes exceeds maximum of {} bytes",
                    length, max_request_size
                ))),
            ));
        }
    }

    Ok(())
}

/// CORS policy for browser clients; preflight requests are answered here
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .max_age(Duration::from_secs(86400))
}

/// Wrap the bare 408 produced by the timeout layer in the API envelope.
/// Must sit directly outside the timeout layer.
pub async fn timeout_response_middleware(request: Request<Body>, next: Next) -> Response {
    let response = next.run(request).await;

    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }

    warn!("Request timed out");
    (
        StatusCode::REQUEST_TIMEOUT,
        Json(ApiResponse::<()>::failure("Request timed out")),
    )
        .into_response()
}

pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'self'"),
    );

    response
}
