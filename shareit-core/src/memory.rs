use async_trait::async_trait;
use chrono::NaiveDateTime;
use shareit_shared::Page;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::{
    Booking, BookingInterval, BookingStatus, Comment, Item, ItemRequest, NewBooking, NewComment,
    NewItem, NewItemRequest, NewUser, User,
};
use crate::repository::{
    BookingFilter, BookingStore, CommentStore, Database, ItemStore, RequestStore, UnitOfWork,
    UserStore,
};
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    items: BTreeMap<i64, Item>,
    bookings: BTreeMap<i64, Booking>,
    comments: BTreeMap<i64, Comment>,
    requests: BTreeMap<i64, ItemRequest>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn remove_item_cascade(&mut self, item_id: i64) {
        self.items.remove(&item_id);
        self.bookings.retain(|_, b| b.item_id != item_id);
        self.comments.retain(|_, c| c.item_id != item_id);
    }
}

/// Process-local store. A unit of work holds the lock for its whole life and
/// edits a private copy of the tables, so transactions are serial and a
/// dropped unit of work leaves no trace.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn begin(&self) -> CoreResult<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> CoreResult<()> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUnitOfWork {
    async fn insert_user(&mut self, user: NewUser) -> CoreResult<User> {
        let id = self.working.next_id();
        let user = User {
            id,
            name: user.name,
            email: user.email,
        };
        self.working.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user(&mut self, id: i64) -> CoreResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn find_users(&mut self, ids: &[i64]) -> CoreResult<Vec<User>> {
        Ok(ids
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|id| self.working.users.get(id).cloned())
            .collect())
    }

    async fn user_exists(&mut self, id: i64) -> CoreResult<bool> {
        Ok(self.working.users.contains_key(&id))
    }

    async fn email_taken(&mut self, email: &str, except: Option<i64>) -> CoreResult<bool> {
        Ok(self
            .working
            .users
            .values()
            .any(|u| u.email == email && Some(u.id) != except))
    }

    async fn list_users(&mut self) -> CoreResult<Vec<User>> {
        Ok(self.working.users.values().cloned().collect())
    }

    async fn update_user(&mut self, user: &User) -> CoreResult<()> {
        match self.working.users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(CoreError::StoreError(format!("no user row {}", user.id))),
        }
    }

    async fn delete_user(&mut self, id: i64) -> CoreResult<()> {
        let tables = &mut self.working;
        tables.users.remove(&id);

        let owned: Vec<i64> = tables
            .items
            .values()
            .filter(|i| i.owner_id == id)
            .map(|i| i.id)
            .collect();
        for item_id in owned {
            tables.remove_item_cascade(item_id);
        }

        tables.bookings.retain(|_, b| b.booker_id != id);
        tables.comments.retain(|_, c| c.author_id != id);

        let dropped: HashSet<i64> = tables
            .requests
            .values()
            .filter(|r| r.requester_id == id)
            .map(|r| r.id)
            .collect();
        tables.requests.retain(|rid, _| !dropped.contains(rid));
        for item in tables.items.values_mut() {
            if item.request_id.is_some_and(|rid| dropped.contains(&rid)) {
                item.request_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ItemStore for MemoryUnitOfWork {
    async fn insert_item(&mut self, item: NewItem) -> CoreResult<Item> {
        let id = self.working.next_id();
        let item = Item {
            id,
            name: item.name,
            description: item.description,
            available: item.available,
            owner_id: item.owner_id,
            request_id: item.request_id,
        };
        self.working.items.insert(id, item.clone());
        Ok(item)
    }

    async fn find_item(&mut self, id: i64) -> CoreResult<Option<Item>> {
        Ok(self.working.items.get(&id).cloned())
    }

    async fn find_items(&mut self, ids: &[i64]) -> CoreResult<Vec<Item>> {
        Ok(ids
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|id| self.working.items.get(id).cloned())
            .collect())
    }

    async fn find_owned_item(&mut self, item_id: i64, owner_id: i64) -> CoreResult<Option<Item>> {
        Ok(self
            .working
            .items
            .get(&item_id)
            .filter(|i| i.owner_id == owner_id)
            .cloned())
    }

    async fn is_item_owner(&mut self, user_id: i64, item_id: i64) -> CoreResult<bool> {
        Ok(self
            .working
            .items
            .get(&item_id)
            .is_some_and(|i| i.owner_id == user_id))
    }

    async fn update_item(&mut self, item: &Item) -> CoreResult<()> {
        match self.working.items.get_mut(&item.id) {
            Some(stored) => {
                *stored = item.clone();
                Ok(())
            }
            None => Err(CoreError::StoreError(format!("no item row {}", item.id))),
        }
    }

    async fn delete_item(&mut self, id: i64) -> CoreResult<()> {
        self.working.remove_item_cascade(id);
        Ok(())
    }

    async fn list_items_by_owner(&mut self, owner_id: i64, page: Page) -> CoreResult<Vec<Item>> {
        let items = self
            .working
            .items
            .values()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(page.slice(items))
    }

    async fn search_available_items(&mut self, text: &str, page: Page) -> CoreResult<Vec<Item>> {
        let needle = text.to_lowercase();
        let items = self
            .working
            .items
            .values()
            .filter(|i| i.available)
            .filter(|i| {
                i.name.to_lowercase().contains(&needle)
                    || i.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        Ok(page.slice(items))
    }

    async fn find_items_by_requests(&mut self, request_ids: &[i64]) -> CoreResult<Vec<Item>> {
        Ok(self
            .working
            .items
            .values()
            .filter(|i| i.request_id.is_some_and(|rid| request_ids.contains(&rid)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookingStore for MemoryUnitOfWork {
    async fn insert_booking(&mut self, booking: NewBooking) -> CoreResult<Booking> {
        let id = self.working.next_id();
        let booking = Booking {
            id,
            start: booking.start,
            end: booking.end,
            item_id: booking.item_id,
            booker_id: booking.booker_id,
            status: booking.status,
        };
        self.working.bookings.insert(id, booking.clone());
        Ok(booking)
    }

    async fn find_booking(&mut self, id: i64) -> CoreResult<Option<Booking>> {
        Ok(self.working.bookings.get(&id).cloned())
    }

    async fn update_booking_status(&mut self, id: i64, status: BookingStatus) -> CoreResult<()> {
        match self.working.bookings.get_mut(&id) {
            Some(booking) => {
                booking.status = status;
                Ok(())
            }
            None => Err(CoreError::StoreError(format!("no booking row {}", id))),
        }
    }

    async fn find_approved_intervals(&mut self, item_id: i64) -> CoreResult<Vec<BookingInterval>> {
        Ok(self
            .working
            .bookings
            .values()
            .filter(|b| b.item_id == item_id && b.status == BookingStatus::Approved)
            .map(Booking::interval)
            .collect())
    }

    async fn query_bookings(
        &mut self,
        filter: &BookingFilter,
        page: Page,
    ) -> CoreResult<Vec<Booking>> {
        let items = &self.working.items;
        let mut bookings: Vec<Booking> = self
            .working
            .bookings
            .values()
            .filter(|b| {
                let owner = items.get(&b.item_id).map(|i| i.owner_id).unwrap_or_default();
                filter.matches(b, owner)
            })
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.start.cmp(&a.start).then(a.id.cmp(&b.id)));
        Ok(page.slice(bookings))
    }

    async fn find_bookings_for_items(&mut self, item_ids: &[i64]) -> CoreResult<Vec<Booking>> {
        Ok(self
            .working
            .bookings
            .values()
            .filter(|b| item_ids.contains(&b.item_id))
            .cloned()
            .collect())
    }

    async fn has_finished_approved_booking(
        &mut self,
        booker_id: i64,
        item_id: i64,
        now: NaiveDateTime,
    ) -> CoreResult<bool> {
        Ok(self.working.bookings.values().any(|b| {
            b.booker_id == booker_id
                && b.item_id == item_id
                && b.status == BookingStatus::Approved
                && b.end < now
        }))
    }
}

#[async_trait]
impl CommentStore for MemoryUnitOfWork {
    async fn insert_comment(&mut self, comment: NewComment) -> CoreResult<Comment> {
        let id = self.working.next_id();
        let comment = Comment {
            id,
            text: comment.text,
            item_id: comment.item_id,
            author_id: comment.author_id,
            created: comment.created,
        };
        self.working.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn find_comments_by_items(&mut self, item_ids: &[i64]) -> CoreResult<Vec<Comment>> {
        Ok(self
            .working
            .comments
            .values()
            .filter(|c| item_ids.contains(&c.item_id))
            .cloned()
            .collect())
    }
}

fn newest_first(requests: &mut [ItemRequest]) {
    requests.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl RequestStore for MemoryUnitOfWork {
    async fn insert_request(&mut self, request: NewItemRequest) -> CoreResult<ItemRequest> {
        let id = self.working.next_id();
        let request = ItemRequest {
            id,
            description: request.description,
            requester_id: request.requester_id,
            created: request.created,
        };
        self.working.requests.insert(id, request.clone());
        Ok(request)
    }

    async fn find_request(&mut self, id: i64) -> CoreResult<Option<ItemRequest>> {
        Ok(self.working.requests.get(&id).cloned())
    }

    async fn list_requests_by_requester(
        &mut self,
        requester_id: i64,
    ) -> CoreResult<Vec<ItemRequest>> {
        let mut requests: Vec<ItemRequest> = self
            .working
            .requests
            .values()
            .filter(|r| r.requester_id == requester_id)
            .cloned()
            .collect();
        newest_first(&mut requests);
        Ok(requests)
    }

    async fn list_requests_of_others(
        &mut self,
        user_id: i64,
        page: Page,
    ) -> CoreResult<Vec<ItemRequest>> {
        let mut requests: Vec<ItemRequest> = self
            .working
            .requests
            .values()
            .filter(|r| r.requester_id != user_id)
            .cloned()
            .collect();
        newest_first(&mut requests);
        Ok(page.slice(requests))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uncommitted_work_is_discarded() {
        let db = MemoryDatabase::new();

        let mut tx = db.begin().await.unwrap();
        tx.insert_user(NewUser {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
        })
        .await
        .unwrap();
        drop(tx);

        let mut tx = db.begin().await.unwrap();
        assert!(tx.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_committed_work_is_visible() {
        let db = MemoryDatabase::new();

        let mut tx = db.begin().await.unwrap();
        let user = tx
            .insert_user(NewUser {
                name: "Ann".to_string(),
                email: "ann@example.com".to_string(),
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert_eq!(tx.find_user(user.id).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_deleting_owner_removes_items_and_their_bookings() {
        let db = MemoryDatabase::new();
        let mut tx = db.begin().await.unwrap();

        let owner = tx
            .insert_user(NewUser {
                name: "Owner".to_string(),
                email: "owner@example.com".to_string(),
            })
            .await
            .unwrap();
        let booker = tx
            .insert_user(NewUser {
                name: "Booker".to_string(),
                email: "booker@example.com".to_string(),
            })
            .await
            .unwrap();
        let item = tx
            .insert_item(NewItem {
                name: "Ladder".to_string(),
                description: "Three metres".to_string(),
                available: true,
                owner_id: owner.id,
                request_id: None,
            })
            .await
            .unwrap();
        let start = chrono::NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let booking = tx
            .insert_booking(NewBooking {
                start,
                end: start + chrono::Duration::days(1),
                item_id: item.id,
                booker_id: booker.id,
                status: BookingStatus::Waiting,
            })
            .await
            .unwrap();

        tx.delete_user(owner.id).await.unwrap();

        assert!(tx.find_item(item.id).await.unwrap().is_none());
        assert!(tx.find_booking(booking.id).await.unwrap().is_none());
        assert!(tx.user_exists(booker.id).await.unwrap());
    }
}
