pub mod admission;
pub mod overlap;
pub mod query;
pub mod transition;

pub use query::BookingState;

use shareit_shared::Page;
use std::sync::Arc;
use tracing::info;

use crate::models::{current_time, BookingRequest, BookingView};
use crate::repository::{BookingStore, Database};
use crate::{CoreError, CoreResult};

/// Booking admission, owner decisions and booking listings. Every call runs
/// in its own unit of work.
#[derive(Clone)]
pub struct BookingService {
    db: Arc<dyn Database>,
}

impl BookingService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    pub async fn create_booking(
        &self,
        request: BookingRequest,
        requester_id: i64,
    ) -> CoreResult<BookingView> {
        let mut tx = self.db.begin().await?;

        let booking = admission::admit_booking(&mut *tx, &request, requester_id).await?;
        let view = query::resolve_views(&mut *tx, vec![booking])
            .await?
            .pop()
            .ok_or_else(|| CoreError::StoreError("created booking vanished".to_string()))?;

        tx.commit().await?;

        info!(
            booking_id = view.booking.id,
            item_id = view.item.id,
            booker_id = requester_id,
            "Booking created"
        );
        Ok(view)
    }

    /// `approved` is the raw query value; see [`transition::parse_decision`].
    pub async fn set_booking_status(
        &self,
        booking_id: i64,
        acting_user_id: i64,
        approved: &str,
    ) -> CoreResult<BookingView> {
        let approve = transition::parse_decision(approved);
        let mut tx = self.db.begin().await?;

        let booking = transition::decide_booking(&mut *tx, booking_id, acting_user_id, approve).await?;
        let view = query::resolve_views(&mut *tx, vec![booking])
            .await?
            .pop()
            .ok_or_else(|| CoreError::StoreError("decided booking vanished".to_string()))?;

        tx.commit().await?;

        info!(booking_id, status = %view.booking.status, "Booking decided");
        Ok(view)
    }

    /// Visible to the booker and to the item owner only.
    pub async fn get_booking(
        &self,
        booking_id: i64,
        requesting_user_id: i64,
    ) -> CoreResult<BookingView> {
        let mut tx = self.db.begin().await?;

        let booking = tx
            .find_booking(booking_id)
            .await?
            .ok_or_else(|| CoreError::missing(format!("Booking with id={} not found", booking_id)))?;
        let view = query::resolve_views(&mut *tx, vec![booking])
            .await?
            .pop()
            .ok_or_else(|| CoreError::StoreError("booking vanished".to_string()))?;

        if view.booking.booker_id != requesting_user_id && view.item.owner_id != requesting_user_id {
            return Err(CoreError::denied(format!(
                "User with id={} has no booking with id={}",
                requesting_user_id, booking_id
            )));
        }

        tx.commit().await?;
        Ok(view)
    }

    pub async fn list_bookings_for_user(
        &self,
        user_id: i64,
        state: &str,
        page: Page,
    ) -> CoreResult<Vec<BookingView>> {
        let mut tx = self.db.begin().await?;
        let views = query::bookings_of_borrower(&mut *tx, user_id, state, page, current_time()).await?;
        tx.commit().await?;
        Ok(views)
    }

    pub async fn list_bookings_for_owner(
        &self,
        user_id: i64,
        state: &str,
        page: Page,
    ) -> CoreResult<Vec<BookingView>> {
        let mut tx = self.db.begin().await?;
        let views = query::bookings_of_owner(&mut *tx, user_id, state, page, current_time()).await?;
        tx.commit().await?;
        Ok(views)
    }
}
