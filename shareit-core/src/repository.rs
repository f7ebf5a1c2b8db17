use async_trait::async_trait;
use chrono::NaiveDateTime;
use shareit_shared::Page;

use crate::models::{
    Booking, BookingInterval, BookingStatus, Comment, Item, ItemRequest, NewBooking, NewComment,
    NewItem, NewItemRequest, NewUser, User,
};
use crate::CoreResult;

/// Which side of a booking the querying user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingRole {
    Borrower,
    Owner,
}

/// Time- or status-based restriction applied on top of the role match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingWindow {
    All,
    /// `start <= now < end`
    Current(NaiveDateTime),
    /// `end < now`
    Past(NaiveDateTime),
    /// `start > now`
    Future(NaiveDateTime),
    Status(BookingStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingFilter {
    pub role: BookingRole,
    pub user_id: i64,
    pub window: BookingWindow,
}

impl BookingFilter {
    /// `item_owner_id` is the owner of `booking.item_id`.
    pub fn matches(&self, booking: &Booking, item_owner_id: i64) -> bool {
        let party = match self.role {
            BookingRole::Borrower => booking.booker_id == self.user_id,
            BookingRole::Owner => item_owner_id == self.user_id,
        };
        party
            && match self.window {
                BookingWindow::All => true,
                BookingWindow::Current(now) => booking.start <= now && now < booking.end,
                BookingWindow::Past(now) => booking.end < now,
                BookingWindow::Future(now) => booking.start > now,
                BookingWindow::Status(status) => booking.status == status,
            }
    }
}

#[async_trait]
pub trait UserStore: Send {
    async fn insert_user(&mut self, user: NewUser) -> CoreResult<User>;

    async fn find_user(&mut self, id: i64) -> CoreResult<Option<User>>;

    async fn find_users(&mut self, ids: &[i64]) -> CoreResult<Vec<User>>;

    async fn user_exists(&mut self, id: i64) -> CoreResult<bool>;

    /// True if another user (other than `except`) already uses `email`.
    async fn email_taken(&mut self, email: &str, except: Option<i64>) -> CoreResult<bool>;

    /// All users, id ascending.
    async fn list_users(&mut self) -> CoreResult<Vec<User>>;

    async fn update_user(&mut self, user: &User) -> CoreResult<()>;

    /// Removes the user together with everything that references them.
    async fn delete_user(&mut self, id: i64) -> CoreResult<()>;
}

#[async_trait]
pub trait ItemStore: Send {
    async fn insert_item(&mut self, item: NewItem) -> CoreResult<Item>;

    async fn find_item(&mut self, id: i64) -> CoreResult<Option<Item>>;

    async fn find_items(&mut self, ids: &[i64]) -> CoreResult<Vec<Item>>;

    async fn find_owned_item(&mut self, item_id: i64, owner_id: i64) -> CoreResult<Option<Item>>;

    async fn is_item_owner(&mut self, user_id: i64, item_id: i64) -> CoreResult<bool>;

    async fn update_item(&mut self, item: &Item) -> CoreResult<()>;

    /// Removes the item together with its bookings and comments.
    async fn delete_item(&mut self, id: i64) -> CoreResult<()>;

    /// Owner's items, id ascending.
    async fn list_items_by_owner(&mut self, owner_id: i64, page: Page) -> CoreResult<Vec<Item>>;

    /// Available items whose name or description contains `text`,
    /// ignoring case, id ascending.
    async fn search_available_items(&mut self, text: &str, page: Page) -> CoreResult<Vec<Item>>;

    async fn find_items_by_requests(&mut self, request_ids: &[i64]) -> CoreResult<Vec<Item>>;
}

#[async_trait]
pub trait BookingStore: Send {
    async fn insert_booking(&mut self, booking: NewBooking) -> CoreResult<Booking>;

    async fn find_booking(&mut self, id: i64) -> CoreResult<Option<Booking>>;

    async fn update_booking_status(&mut self, id: i64, status: BookingStatus) -> CoreResult<()>;

    /// Spans of every APPROVED booking of the item.
    async fn find_approved_intervals(&mut self, item_id: i64) -> CoreResult<Vec<BookingInterval>>;

    /// Bookings matching `filter`, ordered by start descending then id
    /// ascending, cut to `page`.
    async fn query_bookings(&mut self, filter: &BookingFilter, page: Page)
        -> CoreResult<Vec<Booking>>;

    async fn find_bookings_for_items(&mut self, item_ids: &[i64]) -> CoreResult<Vec<Booking>>;

    /// Whether `booker_id` has an APPROVED booking of the item that ended
    /// before `now`.
    async fn has_finished_approved_booking(
        &mut self,
        booker_id: i64,
        item_id: i64,
        now: NaiveDateTime,
    ) -> CoreResult<bool>;
}

#[async_trait]
pub trait CommentStore: Send {
    async fn insert_comment(&mut self, comment: NewComment) -> CoreResult<Comment>;

    /// Comments of the given items, id ascending.
    async fn find_comments_by_items(&mut self, item_ids: &[i64]) -> CoreResult<Vec<Comment>>;
}

#[async_trait]
pub trait RequestStore: Send {
    async fn insert_request(&mut self, request: NewItemRequest) -> CoreResult<ItemRequest>;

    async fn find_request(&mut self, id: i64) -> CoreResult<Option<ItemRequest>>;

    /// Requests of one user, newest first.
    async fn list_requests_by_requester(&mut self, requester_id: i64)
        -> CoreResult<Vec<ItemRequest>>;

    /// Requests of everyone except `user_id`, newest first.
    async fn list_requests_of_others(&mut self, user_id: i64, page: Page)
        -> CoreResult<Vec<ItemRequest>>;
}

/// One transaction against the backing store. Every read and write made
/// through it observes a single consistent snapshot; nothing is visible to
/// others until `commit`. Dropping it without committing rolls back.
#[async_trait]
pub trait UnitOfWork: UserStore + ItemStore + BookingStore + CommentStore + RequestStore {
    async fn commit(self: Box<Self>) -> CoreResult<()>;
}

#[async_trait]
pub trait Database: Send + Sync {
    async fn begin(&self) -> CoreResult<Box<dyn UnitOfWork>>;
}
