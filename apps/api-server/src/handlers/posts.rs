//! Post resource handlers.
//!
//! Thin adapters: pull the principal from the [`Identity`], hand the raw
//! JSON body to [`quill_core::PostService`], and pick the status code.

use actix_web::{HttpResponse, web};
use serde_json::Value;
use uuid::Uuid;

use quill_core::validation::UpdateMode;

use crate::config::ListScope;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Path ids that are not UUIDs cannot name a post.
fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Post with id {raw} not found")))
}

/// GET /v1/posts
pub async fn index(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let posts = match state.list_scope {
        ListScope::Owned => state.posts.list(&identity.principal()).await?,
        ListScope::All => state.posts.list_all().await?,
    };

    Ok(HttpResponse::Ok().json(posts))
}

/// POST /v1/posts
pub async fn store(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let post = state.posts.create(&identity.principal(), &body).await?;

    tracing::info!(post_id = %post.id, user_id = %identity.user_id, "Post created");
    Ok(HttpResponse::Created().json(post))
}

/// GET /v1/posts/{id}
pub async fn show(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let post = state.posts.read(&identity.principal(), id).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// PUT /v1/posts/{id}
pub async fn replace(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    update(state, identity, &path, &body, UpdateMode::Replace).await
}

/// PATCH /v1/posts/{id}
pub async fn patch(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    update(state, identity, &path, &body, UpdateMode::Merge).await
}

async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    raw_id: &str,
    payload: &Value,
    mode: UpdateMode,
) -> AppResult<HttpResponse> {
    let id = parse_id(raw_id)?;
    let post = state
        .posts
        .update(&identity.principal(), id, payload, mode)
        .await?;

    tracing::info!(post_id = %post.id, ?mode, "Post updated");
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /v1/posts/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    state.posts.delete(&identity.principal(), id).await?;

    tracing::info!(post_id = %id, user_id = %identity.user_id, "Post deleted");
    Ok(HttpResponse::NoContent().finish())
}
