use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use serde::Deserialize;
use shareit_shared::Page;

use crate::error::AppError;

pub const SHARER_USER_ID: &str = "X-Sharer-User-Id";

// ============================================================================
// Acting User
// ============================================================================

/// The user a request acts for, taken from the `X-Sharer-User-Id` header.
/// The header is trusted as-is; it only has to be a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharerId(pub i64);

impl<S> FromRequestParts<S> for SharerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // 1. Header must be present
        let raw = parts.headers.get(SHARER_USER_ID).ok_or_else(|| {
            AppError::ValidationError(format!("Missing {} header", SHARER_USER_ID))
        })?;

        // 2. ...and hold a positive id
        raw.to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(SharerId)
            .ok_or_else(|| {
                AppError::ValidationError(format!("Invalid {} header", SHARER_USER_ID))
            })
    }
}

// ============================================================================
// Body / Query wrappers
// ============================================================================

/// `axum::Json` whose rejections render as `{"error": ...}` with 400.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Query` with the same error rendering as [`AppJson`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// `from` / `size` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl PageParams {
    pub fn page(&self, default_size: i64) -> Result<Page, AppError> {
        Ok(Page::new(
            self.from.unwrap_or(0),
            self.size.unwrap_or(default_size),
        )?)
    }
}
