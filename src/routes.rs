//! HTTP handlers for the content API.
//!
//! Each handler validates its input, then asks the store for a live
//! connection, then runs the operation. Validation failures answer 400
//! before any connection attempt is made.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::{
    error::AppError,
    posts::{self, PostInput, PostResponse},
    state::State as AppState,
};

pub async fn list_posts_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let db = state.store.ensure_connected().await?;
    let all = posts::list_posts(&db).await?;

    Ok(Json(all.into_iter().map(PostResponse::from).collect()))
}

pub async fn create_post_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<PostInput>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    posts::validate_create(&input)?;

    let db = state.store.ensure_connected().await?;
    let post = posts::create_post(&db, input).await?;

    Ok((StatusCode::CREATED, Json(post.into())))
}

pub async fn update_post_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<PostInput>,
) -> Result<Json<PostResponse>, AppError> {
    posts::validate_update(&input)?;

    let db = state.store.ensure_connected().await?;
    let post = posts::update_post(&db, &id, input).await?;

    Ok(Json(post.into()))
}

pub async fn delete_post_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let db = state.store.ensure_connected().await?;
    posts::delete_post(&db, &id).await?;

    Ok(Json(json!({ "message": "Post deleted successfully" })))
}

/// Reports store connectivity without requiring it. Always 200.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "connected": state.store.is_connected().await,
    }))
}
