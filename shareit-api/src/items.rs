use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shareit_core::models::{
    CommentDraft, CommentView, Item, ItemDetails, ItemDraft, ItemPatch, ShortBooking,
};

use crate::error::AppError;
use crate::extract::{AppJson, AppQuery, PageParams, SharerId};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemDetailsResponse {
    #[serde(flatten)]
    pub item: ItemResponse,
    pub last_booking: Option<ShortBooking>,
    pub next_booking: Option<ShortBooking>,
    pub comments: Vec<CommentView>,
}

impl From<ItemDetails> for ItemDetailsResponse {
    fn from(details: ItemDetails) -> Self {
        Self {
            item: details.item.into(),
            last_booking: details.last_booking,
            next_booking: details.next_booking,
            comments: details.comments,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub text: String,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_own_items).post(create_item))
        .route("/items/search", get(search_items))
        .route(
            "/items/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .route("/items/{id}/comment", post(add_comment))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /items
pub async fn create_item(
    State(state): State<AppState>,
    SharerId(owner_id): SharerId,
    AppJson(draft): AppJson<ItemDraft>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = state.items.add_item(owner_id, draft).await?;
    Ok(Json(item.into()))
}

/// GET /items?from=&size=
/// The caller's own items, with booking neighbours and comments.
pub async fn list_own_items(
    State(state): State<AppState>,
    SharerId(owner_id): SharerId,
    AppQuery(params): AppQuery<PageParams>,
) -> Result<Json<Vec<ItemDetailsResponse>>, AppError> {
    let page = params.page(state.default_page_size)?;
    let items = state.items.list_owner_items(owner_id, page).await?;
    Ok(Json(items.into_iter().map(ItemDetailsResponse::from).collect()))
}

/// GET /items/search?text=&from=&size=
pub async fn search_items(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppQuery(params): AppQuery<SearchParams>,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    let page = PageParams {
        from: params.from,
        size: params.size,
    }
    .page(state.default_page_size)?;
    let items = state.items.search_items(user_id, &params.text, page).await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

/// GET /items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    Path(item_id): Path<i64>,
) -> Result<Json<ItemDetailsResponse>, AppError> {
    let details = state.items.get_item(item_id, user_id).await?;
    Ok(Json(details.into()))
}

/// PATCH /items/{id}
pub async fn update_item(
    State(state): State<AppState>,
    SharerId(owner_id): SharerId,
    Path(item_id): Path<i64>,
    AppJson(patch): AppJson<ItemPatch>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = state.items.update_item(item_id, owner_id, patch).await?;
    Ok(Json(item.into()))
}

/// DELETE /items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    SharerId(owner_id): SharerId,
    Path(item_id): Path<i64>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = state.items.delete_item(item_id, owner_id).await?;
    Ok(Json(item.into()))
}

/// POST /items/{id}/comment
pub async fn add_comment(
    State(state): State<AppState>,
    SharerId(author_id): SharerId,
    Path(item_id): Path<i64>,
    AppJson(draft): AppJson<CommentDraft>,
) -> Result<Json<CommentView>, AppError> {
    let comment = state.items.add_comment(item_id, author_id, draft).await?;
    Ok(Json(comment))
}
