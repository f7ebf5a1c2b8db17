use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Item, User};

/// Booking lifecycle: created `Waiting`, decided once by the item owner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown booking status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

impl Booking {
    pub fn interval(&self) -> BookingInterval {
        BookingInterval {
            start: self.start,
            end: self.end,
        }
    }

    /// Only an approval is final; a rejected booking can still be decided again.
    pub fn is_decided(&self) -> bool {
        self.status == BookingStatus::Approved
    }

    pub fn to_short(&self) -> ShortBooking {
        ShortBooking {
            id: self.id,
            start: self.start,
            end: self.end,
            item_id: self.item_id,
            booker_id: self.booker_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

/// What a borrower submits when asking for an item.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub item_id: i64,
}

/// Just the time span of a booking; what the overlap check works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Compact booking reference used on item pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortBooking {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub item_id: i64,
    pub booker_id: i64,
}

/// A booking with its item and booker resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingView {
    pub booking: Booking,
    pub item: Item,
    pub booker: User,
}
