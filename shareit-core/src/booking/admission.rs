use tracing::warn;

use super::overlap::conflicts_with_any;
use crate::models::{
    whole_seconds, Booking, BookingInterval, BookingRequest, BookingStatus, NewBooking,
};
use crate::repository::{BookingStore, ItemStore, UnitOfWork, UserStore};
use crate::{CoreError, CoreResult};

/// Decide whether `request` may become a booking and, if so, write it as
/// WAITING. Checks run in a fixed order and the first failure is returned:
///
/// Both ends are cut to whole seconds first.
///
/// 1. interval ordering
/// 2. item exists
/// 3. item is available
/// 4. requester is not the owner (reported as not found)
/// 5. requester exists
/// 6. no APPROVED booking of the item overlaps
pub async fn admit_booking(
    tx: &mut dyn UnitOfWork,
    request: &BookingRequest,
    requester_id: i64,
) -> CoreResult<Booking> {
    let (start, end) = (whole_seconds(request.start), whole_seconds(request.end));
    if start >= end {
        return Err(CoreError::InvalidInterval { start, end });
    }

    let item = tx
        .find_item(request.item_id)
        .await?
        .ok_or_else(|| CoreError::missing(format!("Item with id={} not found", request.item_id)))?;

    if !item.available {
        return Err(CoreError::NotAvailable(format!(
            "Item with id={} not available",
            item.id
        )));
    }

    if item.owner_id == requester_id {
        warn!(item_id = item.id, user_id = requester_id, "Owner tried to book own item");
        return Err(CoreError::denied(format!(
            "Item with id={} suitable for booking not found",
            item.id
        )));
    }

    if tx.find_user(requester_id).await?.is_none() {
        return Err(CoreError::user_not_found(requester_id));
    }

    let candidate = BookingInterval::new(start, end);
    let approved = tx.find_approved_intervals(item.id).await?;
    if conflicts_with_any(&candidate, &approved) {
        return Err(CoreError::NotAvailable("This time is already booked".to_string()));
    }

    tx.insert_booking(NewBooking {
        start,
        end,
        item_id: item.id,
        booker_id: requester_id,
        status: BookingStatus::Waiting,
    })
    .await
}
