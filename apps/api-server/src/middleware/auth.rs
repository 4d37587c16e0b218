//! Authentication extractor.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use quill_core::domain::Principal;
use quill_core::ports::{AuthError, TokenClaims};

use super::error::AppError;
use crate::state::AppState;

/// Cache key under which a revoked token id is stored.
pub fn revocation_key(jti: Uuid) -> String {
    format!("revoked_token:{jti}")
}

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    /// Id of the presented token.
    pub token_id: Uuid,
    /// Expiry of the presented token (unix seconds).
    pub expires_at: i64,
}

impl Identity {
    /// The principal to pass into domain operations.
    pub fn principal(&self) -> Principal {
        Principal::new(self.user_id)
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            token_id: claims.jti,
            expires_at: claims.exp,
        }
    }
}

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(req: &HttpRequest) -> Result<String, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let Some(state) = state else {
                return Err(AppError::Internal(
                    "AppState not found in app data".to_string(),
                ));
            };

            let claims = state.tokens.validate_token(&token?)?;

            if state.revoked_tokens.exists(&revocation_key(claims.jti)).await {
                return Err(AuthError::TokenRevoked.into());
            }

            Ok(Identity::from(claims))
        })
    }
}
