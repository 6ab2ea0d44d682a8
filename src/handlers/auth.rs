use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use crate::models::ApiResponse;

/// Header carrying the caller identity established by the upstream auth layer
pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller on whose behalf a cart request runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

#[derive(Debug)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::failure("Authentication required")),
        )
            .into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                warn!("Request without caller identity");
                AuthRejection
            })?;

        Ok(AuthenticatedUser {
            user_id: user_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<AuthenticatedUser, AuthRejection> {
        let (mut parts, _) = request.into_parts();
        AuthenticatedUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_reads_user_from_header() {
        let request = Request::builder()
            .header(USER_ID_HEADER, " user123 ")
            .body(())
            .unwrap();

        let user = extract(request).await.unwrap();
        assert_eq!(user.user_id, "user123");
    }

    #[tokio::test]
    async fn test_missing_or_blank_header_is_rejected() {
        let request = Request::builder().body(()).unwrap();
        assert!(extract(request).await.is_err());

        let request = Request::builder()
            .header(USER_ID_HEADER, "   ")
            .body(())
            .unwrap();
        let rejection = extract(request).await.unwrap_err();
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
