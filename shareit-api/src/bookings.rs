use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shareit_core::models::{BookingRequest, BookingStatus, BookingView};

use crate::error::AppError;
use crate::extract::{AppJson, AppQuery, PageParams, SharerId};
use crate::items::ItemResponse;
use crate::state::AppState;
use crate::users::UserResponse;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
    pub item: ItemResponse,
    pub booker: UserResponse,
}

impl From<BookingView> for BookingResponse {
    fn from(view: BookingView) -> Self {
        Self {
            id: view.booking.id,
            start: view.booking.start,
            end: view.booking.end,
            status: view.booking.status,
            item: view.item.into(),
            booker: view.booker.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DecisionParams {
    pub approved: String,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub state: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl ListParams {
    fn state(&self) -> &str {
        self.state.as_deref().unwrap_or("ALL")
    }

    fn page(&self, default_size: i64) -> Result<shareit_shared::Page, AppError> {
        PageParams {
            from: self.from,
            size: self.size,
        }
        .page(default_size)
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking).get(list_for_booker))
        .route("/bookings/owner", get(list_for_owner))
        .route("/bookings/{id}", get(get_booking).patch(decide_booking))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /bookings
/// New bookings start out WAITING.
pub async fn create_booking(
    State(state): State<AppState>,
    SharerId(booker_id): SharerId,
    AppJson(request): AppJson<BookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let view = state.bookings.create_booking(request, booker_id).await?;
    Ok(Json(view.into()))
}

/// PATCH /bookings/{id}?approved=true|false
pub async fn decide_booking(
    State(state): State<AppState>,
    SharerId(owner_id): SharerId,
    Path(booking_id): Path<i64>,
    AppQuery(params): AppQuery<DecisionParams>,
) -> Result<Json<BookingResponse>, AppError> {
    let view = state
        .bookings
        .set_booking_status(booking_id, owner_id, &params.approved)
        .await?;
    Ok(Json(view.into()))
}

/// GET /bookings/{id}
/// Visible to the booker and the item owner.
pub async fn get_booking(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingResponse>, AppError> {
    let view = state.bookings.get_booking(booking_id, user_id).await?;
    Ok(Json(view.into()))
}

/// GET /bookings?state=&from=&size=
pub async fn list_for_booker(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let page = params.page(state.default_page_size)?;
    let views = state
        .bookings
        .list_bookings_for_user(user_id, params.state(), page)
        .await?;
    Ok(Json(views.into_iter().map(BookingResponse::from).collect()))
}

/// GET /bookings/owner?state=&from=&size=
pub async fn list_for_owner(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let page = params.page(state.default_page_size)?;
    let views = state
        .bookings
        .list_bookings_for_owner(user_id, params.state(), page)
        .await?;
    Ok(Json(views.into_iter().map(BookingResponse::from).collect()))
}
