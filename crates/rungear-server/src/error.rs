//! HTTP error mapping.

use axum::http::header::InvalidHeaderValue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rungear_auth::AuthError;
use rungear_cache::CacheError;
use rungear_commerce::CommerceError;
use thiserror::Error;

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(err) if err.is_forgery() => StatusCode::FORBIDDEN,
            AppError::Commerce(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match status {
            StatusCode::FORBIDDEN => {
                tracing::warn!(error = %self, "anti-forgery check failed");
                "invalid anti-forgery token".to_string()
            }
            StatusCode::BAD_REQUEST => {
                tracing::warn!(error = %self, "request rejected");
                self.to_string()
            }
            _ => {
                tracing::error!(error = %self, "request failed");
                "internal error".to_string()
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(AuthError::CsrfMismatch).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(CommerceError::ProductNotFound(99)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(CommerceError::Gateway("connection reset".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(AuthError::CsrfMissing).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let response =
            AppError::from(CommerceError::Gateway("db password wrong".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
