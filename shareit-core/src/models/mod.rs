pub mod booking;
pub mod comment;
pub mod item;
pub mod request;
pub mod user;

pub use booking::{
    Booking, BookingInterval, BookingRequest, BookingStatus, BookingView, NewBooking, ShortBooking,
};
pub use comment::{Comment, CommentDraft, CommentView, NewComment};
pub use item::{Item, ItemDetails, ItemDraft, ItemPatch, NewItem};
pub use request::{ItemRequest, ItemRequestView, NewItemRequest, RequestDraft};
pub use user::{NewUser, User, UserPatch};

use chrono::{Local, NaiveDateTime, Timelike};

/// Wall-clock "now" in local time, truncated to whole seconds to match the
/// precision bookings are stored with.
pub fn current_time() -> NaiveDateTime {
    whole_seconds(Local::now().naive_local())
}

/// Drops the fractional second. Bookings are stored to the second, so
/// anything finer is cut before it is compared or written.
pub fn whole_seconds(at: NaiveDateTime) -> NaiveDateTime {
    at.with_nanosecond(0).unwrap_or(at)
}
