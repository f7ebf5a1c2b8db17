use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use shareit_core::models::{ItemRequestView, RequestDraft};

use crate::error::AppError;
use crate::extract::{AppJson, AppQuery, PageParams, SharerId};
use crate::items::ItemResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ItemRequestResponse {
    pub id: i64,
    pub description: String,
    pub requester_id: i64,
    pub created: NaiveDateTime,
    pub items: Vec<ItemResponse>,
}

impl From<ItemRequestView> for ItemRequestResponse {
    fn from(view: ItemRequestView) -> Self {
        Self {
            id: view.request.id,
            description: view.request.description,
            requester_id: view.request.requester_id,
            created: view.request.created,
            items: view.items.into_iter().map(ItemResponse::from).collect(),
        }
    }
}

fn into_responses(views: Vec<ItemRequestView>) -> Vec<ItemRequestResponse> {
    views.into_iter().map(ItemRequestResponse::from).collect()
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(list_own_requests).post(create_request))
        .route("/requests/all", get(list_other_requests))
        .route("/requests/{id}", get(get_request))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /requests
pub async fn create_request(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppJson(draft): AppJson<RequestDraft>,
) -> Result<Json<ItemRequestResponse>, AppError> {
    let view = state.requests.add_request(user_id, draft).await?;
    Ok(Json(view.into()))
}

/// GET /requests
/// The caller's own requests, newest first, with the items offered for them.
pub async fn list_own_requests(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
) -> Result<Json<Vec<ItemRequestResponse>>, AppError> {
    let views = state.requests.list_own_requests(user_id).await?;
    Ok(Json(into_responses(views)))
}

/// GET /requests/all?from=&size=
pub async fn list_other_requests(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppQuery(params): AppQuery<PageParams>,
) -> Result<Json<Vec<ItemRequestResponse>>, AppError> {
    let page = params.page(state.default_page_size)?;
    let views = state.requests.list_other_requests(user_id, page).await?;
    Ok(Json(into_responses(views)))
}

/// GET /requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    Path(request_id): Path<i64>,
) -> Result<Json<ItemRequestResponse>, AppError> {
    let view = state.requests.get_request(user_id, request_id).await?;
    Ok(Json(view.into()))
}
