//! Error handling - maps every failure onto the JSON error body.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use quill_core::error::{DomainError, RepoError};
use quill_core::ports::AuthError;
use quill_core::validation::ValidationErrors;
use quill_shared::ErrorResponse;

/// Application-level error type rendered as `{success, message, error, code}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation errors: {0}")]
    Validation(ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::NotFound(detail) => {
                tracing::debug!("Not found: {}", detail);
                ErrorResponse::not_found()
            }
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail.clone()),
            AppError::Unauthenticated(detail) => {
                tracing::debug!("Rejected credentials: {}", detail);
                ErrorResponse::unauthenticated()
            }
            AppError::InvalidCredentials => ErrorResponse::invalid_credentials(),
            AppError::Forbidden(message) => ErrorResponse::forbidden(message.clone()),
            AppError::Validation(errors) => ErrorResponse::validation(errors.clone().into_inner()),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Validation(errors) => AppError::Validation(errors),
            DomainError::Forbidden(message) => AppError::Forbidden(message.to_string()),
            DomainError::Repository(e) => e.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => {
                tracing::warn!("Constraint violation: {}", msg);
                AppError::Internal("Database constraint violation".to_string())
            }
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::HashingError(msg) | AuthError::Encoding(msg) => AppError::Internal(msg),
            other => AppError::Unauthenticated(other.to_string()),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use quill_core::policy::NOT_OWNER_MESSAGE;
    use uuid::Uuid;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.error_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_forbidden_carries_fixed_message() {
        let err = AppError::from(DomainError::Forbidden(NOT_OWNER_MESSAGE));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Forbidden");
        assert_eq!(body["message"], NOT_OWNER_MESSAGE);
        assert_eq!(body["code"], 403);
    }

    #[actix_web::test]
    async fn test_not_found_hides_detail() {
        let err = AppError::from(DomainError::NotFound {
            entity_type: "Post",
            id: Uuid::new_v4(),
        });
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "The requested resource was not found.");
        assert_eq!(body["error"], "Not Found");
    }

    #[actix_web::test]
    async fn test_auth_failures_are_401() {
        let (status, body) = body_of(AuthError::TokenExpired.into()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthenticated");
        assert_eq!(
            body["message"],
            "Authentication required. Please log in to access this resource."
        );
    }

    #[actix_web::test]
    async fn test_store_failures_do_not_leak() {
        let err = AppError::from(RepoError::Query("relation \"posts\" does not exist".into()));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An unexpected error occurred.");
    }
}
