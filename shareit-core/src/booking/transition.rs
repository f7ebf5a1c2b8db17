use tracing::warn;

use crate::models::{Booking, BookingStatus};
use crate::repository::{BookingStore, ItemStore, UnitOfWork};
use crate::{CoreError, CoreResult};

/// `"true"` in any letter case approves; every other value rejects.
pub fn parse_decision(approved: &str) -> bool {
    approved.eq_ignore_ascii_case("true")
}

/// Owner's one-shot decision on a booking. An APPROVED booking is final and
/// refuses any further change, even a repeat approval. A REJECTED one does
/// not. Non-owners get the same answer as for a booking that does not exist.
pub async fn decide_booking(
    tx: &mut dyn UnitOfWork,
    booking_id: i64,
    acting_user_id: i64,
    approve: bool,
) -> CoreResult<Booking> {
    let mut booking = tx
        .find_booking(booking_id)
        .await?
        .ok_or_else(|| CoreError::missing(format!("Booking with id={} not found", booking_id)))?;

    if booking.is_decided() {
        return Err(CoreError::NotAvailable(format!(
            "Status change is not available for booking with id={}",
            booking_id
        )));
    }

    if !tx.is_item_owner(acting_user_id, booking.item_id).await? {
        warn!(booking_id, user_id = acting_user_id, "Status change by non-owner");
        return Err(CoreError::denied(format!(
            "User with id={} has no booking with id={}",
            acting_user_id, booking_id
        )));
    }

    let status = if approve {
        BookingStatus::Approved
    } else {
        BookingStatus::Rejected
    };
    tx.update_booking_status(booking.id, status).await?;
    booking.status = status;

    Ok(booking)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decision() {
        assert!(parse_decision("true"));
        assert!(parse_decision("TRUE"));
        assert!(parse_decision("True"));
        assert!(!parse_decision("false"));
        assert!(!parse_decision("yes"));
        assert!(!parse_decision(""));
    }
}
