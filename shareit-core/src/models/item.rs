use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Booking, BookingStatus, CommentView, ShortBooking};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

/// What an owner submits when listing an item. `available` has no default;
/// leaving it out is a validation error.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ItemDraft {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub name: String,
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub description: String,
    #[validate(required(message = "must be set"))]
    pub available: Option<bool>,
    pub request_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ItemPatch {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub description: Option<String>,
    pub available: Option<bool>,
}

impl Item {
    pub fn apply(&mut self, patch: ItemPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(available) = patch.available {
            self.available = available;
        }
    }
}

/// Item page: the item, its comments and, for the owner only, the nearest
/// approved bookings on either side of `now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetails {
    pub item: Item,
    pub last_booking: Option<ShortBooking>,
    pub next_booking: Option<ShortBooking>,
    pub comments: Vec<CommentView>,
}

impl ItemDetails {
    /// `bookings` and `comments` may span several items; only the ones
    /// belonging to `item` are used.
    pub fn assemble(
        item: Item,
        comments: &[(i64, CommentView)],
        bookings: &[Booking],
        now: NaiveDateTime,
    ) -> Self {
        let approved = || {
            bookings
                .iter()
                .filter(|b| b.item_id == item.id && b.status == BookingStatus::Approved)
        };

        let last_booking = approved()
            .filter(|b| b.start < now)
            .max_by_key(|b| b.start)
            .map(Booking::to_short);
        let next_booking = approved()
            .filter(|b| b.start > now)
            .min_by_key(|b| b.start)
            .map(Booking::to_short);

        let comments = comments
            .iter()
            .filter(|(item_id, _)| *item_id == item.id)
            .map(|(_, view)| view.clone())
            .collect();

        Self {
            item,
            last_booking,
            next_booking,
            comments,
        }
    }
}
