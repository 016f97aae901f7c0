//! HTTP error mapping.
//!
//! Every handler returns `Result<_, ApiError>`; the error renders as
//! `{"error": "<message>"}` with a status picked from the failure kind.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::auth::AuthError;
use crate::catalog::CatalogError;
use crate::images::ImageStoreError;
use crate::orders::OrderError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    Multipart(#[from] MultipartError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Multipart(e) => e.status(),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(_) | OrderError::UnknownBook(_) => {
                ApiError::BadRequest(err.to_string())
            }
            OrderError::NotFound(_) => ApiError::NotFound(err.to_string()),
            OrderError::InsufficientStock { .. } => ApiError::Conflict(err.to_string()),
            OrderError::DuplicateCode(_) | OrderError::Timeout(_) | OrderError::Storage(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(_) => ApiError::BadRequest(err.to_string()),
            CatalogError::NotFound(_) => ApiError::NotFound(err.to_string()),
            CatalogError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ImageStoreError> for ApiError {
    fn from(err: ImageStoreError) -> Self {
        match err {
            ImageStoreError::InvalidName(_) | ImageStoreError::Empty => {
                ApiError::BadRequest(err.to_string())
            }
            ImageStoreError::Io(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(format!("invalid id: {}", rejection.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "request failed");
        }

        let body = serde_json::json!({
            "error": message,
        });

        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            serde_json::to_string(&body)
                .unwrap_or_else(|_| "{\"error\":\"Internal error\"}".to_string()),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::StorageError;

    #[test]
    fn test_order_errors_map_to_statuses() {
        let cases = [
            (OrderError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (OrderError::UnknownBook(9), StatusCode::BAD_REQUEST),
            (OrderError::NotFound("order 1".into()), StatusCode::NOT_FOUND),
            (
                OrderError::InsufficientStock {
                    book_id: 1,
                    requested: 4,
                    available: 2,
                },
                StatusCode::CONFLICT,
            ),
            (
                OrderError::Timeout(std::time::Duration::from_secs(5)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                OrderError::Storage(StorageError::Database(sqlx::Error::PoolClosed)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_auth_and_catalog_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(CatalogError::NotFound(3)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CatalogError::Validation("title is required".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::NotFound("book 3 not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "book 3 not found"}));
    }
}
