use chrono::NaiveDateTime;
use shareit_shared::Page;
use std::collections::HashMap;
use std::str::FromStr;

use crate::models::{Booking, BookingStatus, BookingView, Item, User};
use crate::repository::{
    BookingFilter, BookingRole, BookingStore, BookingWindow, ItemStore, UnitOfWork, UserStore,
};
use crate::{CoreError, CoreResult};

/// Listing filter as named by clients. The first four are time windows, the
/// rest select by status name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    All,
    Current,
    Past,
    Future,
    Waiting,
    Approved,
    Rejected,
    Canceled,
}

impl FromStr for BookingState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(BookingState::All),
            "CURRENT" => Ok(BookingState::Current),
            "PAST" => Ok(BookingState::Past),
            "FUTURE" => Ok(BookingState::Future),
            "WAITING" => Ok(BookingState::Waiting),
            "APPROVED" => Ok(BookingState::Approved),
            "REJECTED" => Ok(BookingState::Rejected),
            "CANCELED" => Ok(BookingState::Canceled),
            other => Err(CoreError::UnsupportedState(other.to_string())),
        }
    }
}

impl BookingState {
    /// Resolve against `now`. CANCELED names no status a booking can have,
    /// so it fails the same way an unknown name does.
    pub fn window(self, now: NaiveDateTime) -> CoreResult<BookingWindow> {
        Ok(match self {
            BookingState::All => BookingWindow::All,
            BookingState::Current => BookingWindow::Current(now),
            BookingState::Past => BookingWindow::Past(now),
            BookingState::Future => BookingWindow::Future(now),
            BookingState::Waiting => BookingWindow::Status(BookingStatus::Waiting),
            BookingState::Approved => BookingWindow::Status(BookingStatus::Approved),
            BookingState::Rejected => BookingWindow::Status(BookingStatus::Rejected),
            BookingState::Canceled => {
                return Err(CoreError::UnsupportedState("CANCELED".to_string()))
            }
        })
    }
}

/// Borrower listing: bookings the user made, with item and booker resolved,
/// newest start first and id ascending on ties.
pub async fn bookings_of_borrower(
    tx: &mut dyn UnitOfWork,
    user_id: i64,
    state: &str,
    page: Page,
    now: NaiveDateTime,
) -> CoreResult<Vec<BookingView>> {
    let booker = tx
        .find_user(user_id)
        .await?
        .ok_or_else(|| CoreError::user_not_found(user_id))?;
    let window = state.parse::<BookingState>()?.window(now)?;

    let filter = BookingFilter {
        role: BookingRole::Borrower,
        user_id,
        window,
    };
    let bookings = tx.query_bookings(&filter, page).await?;

    let item_ids: Vec<i64> = bookings.iter().map(|b| b.item_id).collect();
    let items = index_items(tx.find_items(&item_ids).await?);

    let mut views = bookings
        .into_iter()
        .map(|booking| {
            let item = lookup(&items, booking.item_id, "item")?;
            Ok(BookingView {
                booking,
                item,
                booker: booker.clone(),
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    views.sort_by(|a, b| {
        b.booking
            .start
            .cmp(&a.booking.start)
            .then(a.booking.id.cmp(&b.booking.id))
    });
    Ok(views)
}

/// Owner listing: bookings of any item the user owns, in store order
/// (newest start first).
pub async fn bookings_of_owner(
    tx: &mut dyn UnitOfWork,
    user_id: i64,
    state: &str,
    page: Page,
    now: NaiveDateTime,
) -> CoreResult<Vec<BookingView>> {
    if !tx.user_exists(user_id).await? {
        return Err(CoreError::user_not_found(user_id));
    }
    let window = state.parse::<BookingState>()?.window(now)?;

    let filter = BookingFilter {
        role: BookingRole::Owner,
        user_id,
        window,
    };
    let bookings = tx.query_bookings(&filter, page).await?;
    resolve_views(tx, bookings).await
}

/// Attach item and booker to each booking, keeping the input order.
pub async fn resolve_views(
    tx: &mut dyn UnitOfWork,
    bookings: Vec<Booking>,
) -> CoreResult<Vec<BookingView>> {
    let item_ids: Vec<i64> = bookings.iter().map(|b| b.item_id).collect();
    let booker_ids: Vec<i64> = bookings.iter().map(|b| b.booker_id).collect();
    let items = index_items(tx.find_items(&item_ids).await?);
    let users: HashMap<i64, User> = tx
        .find_users(&booker_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    bookings
        .into_iter()
        .map(|booking| {
            let item = lookup(&items, booking.item_id, "item")?;
            let booker = lookup(&users, booking.booker_id, "user")?;
            Ok(BookingView {
                booking,
                item,
                booker,
            })
        })
        .collect()
}

fn index_items(items: Vec<Item>) -> HashMap<i64, Item> {
    items.into_iter().map(|i| (i.id, i)).collect()
}

fn lookup<T: Clone>(rows: &HashMap<i64, T>, id: i64, kind: &str) -> CoreResult<T> {
    rows.get(&id)
        .cloned()
        .ok_or_else(|| CoreError::StoreError(format!("booking references missing {} {}", kind, id)))
}
