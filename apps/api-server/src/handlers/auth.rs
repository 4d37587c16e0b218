//! Authentication handlers.

use std::time::Duration;

use actix_web::{HttpResponse, web};

use quill_core::domain::User;
use quill_core::error::RepoError;
use quill_core::validation::ValidationErrors;
use quill_shared::MessageResponse;
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UserResponse};

use crate::middleware::auth::{Identity, revocation_key};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MAX_FIELD_CHARS: usize = 255;
const MIN_PASSWORD_CHARS: usize = 8;
const EMAIL_TAKEN: &str = "The email has already been taken.";

fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        created_at: user.created_at.to_rfc3339(),
        updated_at: user.updated_at.to_rfc3339(),
    }
}

fn auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = state.tokens.generate_token(user.id, &user.email)?;

    Ok(AuthResponse {
        user: user_response(user),
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    })
}

fn validate_registration(req: &RegisterUserRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if req.name.trim().is_empty() {
        errors.add("name", "The name field is required.");
    } else if req.name.chars().count() > MAX_FIELD_CHARS {
        errors.add(
            "name",
            "The name field must not be greater than 255 characters.",
        );
    }

    if req.email.trim().is_empty() {
        errors.add("email", "The email field is required.");
    } else if !req.email.contains('@') {
        errors.add("email", "The email field must be a valid email address.");
    } else if req.email.chars().count() > MAX_FIELD_CHARS {
        errors.add(
            "email",
            "The email field must not be greater than 255 characters.",
        );
    }

    if req.password.is_empty() {
        errors.add("password", "The password field is required.");
    } else if req.password.chars().count() < MIN_PASSWORD_CHARS {
        errors.add(
            "password",
            "The password field must be at least 8 characters.",
        );
    }

    errors.into_result()
}

/// POST /v1/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_registration(&req).map_err(AppError::Validation)?;

    if state.users.find_by_email(&req.email).await?.is_some() {
        let mut errors = ValidationErrors::new();
        errors.add("email", EMAIL_TAKEN);
        return Err(AppError::Validation(errors));
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user = User::new(req.name, req.email, password_hash);

    let saved_user = match state.users.insert(user).await {
        Ok(user) => user,
        // Lost a race with a concurrent registration.
        Err(RepoError::Constraint(_)) => {
            let mut errors = ValidationErrors::new();
            errors.add("email", EMAIL_TAKEN);
            return Err(AppError::Validation(errors));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %saved_user.id, "User registered");
    Ok(HttpResponse::Created().json(auth_response(&state, &saved_user)?))
}

/// POST /v1/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut errors = ValidationErrors::new();
    if req.email.trim().is_empty() {
        errors.add("email", "The email field is required.");
    }
    if req.password.is_empty() {
        errors.add("password", "The password field is required.");
    }
    errors.into_result().map_err(AppError::Validation)?;

    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::info!(user_id = %user.id, "Login rejected: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    Ok(HttpResponse::Ok().json(auth_response(&state, &user)?))
}

/// POST /v1/auth/logout - revokes the presented token.
pub async fn logout(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let remaining = identity.expires_at - chrono::Utc::now().timestamp();
    let ttl = Duration::from_secs(remaining.max(1) as u64);

    state
        .revoked_tokens
        .set(&revocation_key(identity.token_id), "1", Some(ttl))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %identity.user_id, "Token revoked");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out successfully.")))
}

/// GET /v1/user
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", identity.user_id)))?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_registration(&request("Ada", "ada@example.com", "password1")).is_ok());
    }

    #[test]
    fn test_registration_field_errors() {
        let errors = validate_registration(&request("", "nope", "short")).unwrap_err();

        assert_eq!(
            errors.field("name").unwrap(),
            ["The name field is required."]
        );
        assert_eq!(
            errors.field("email").unwrap(),
            ["The email field must be a valid email address."]
        );
        assert_eq!(
            errors.field("password").unwrap(),
            ["The password field must be at least 8 characters."]
        );
    }
}
