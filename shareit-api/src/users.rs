use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use shareit_core::models::{NewUser, User, UserPatch};
use shareit_shared::Masked;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: Masked<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: Masked(user.email),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.add_user(body).await?;
    Ok(Json(user.into()))
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.get_user(user_id).await?;
    Ok(Json(user.into()))
}

/// PATCH /users/{id}
/// Only the fields present in the body change.
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    AppJson(patch): AppJson<UserPatch>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.update_user(user_id, patch).await?;
    Ok(Json(user.into()))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.delete_user(user_id).await?;
    Ok(Json(user.into()))
}
