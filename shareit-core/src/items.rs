use shareit_shared::Page;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{
    current_time, CommentDraft, CommentView, Item, ItemDetails, ItemDraft, ItemPatch, NewComment,
    NewItem,
};
use crate::repository::{
    BookingStore, CommentStore, Database, ItemStore, RequestStore, UnitOfWork, UserStore,
};
use crate::users::require_user;
use crate::validation::validate;
use crate::{CoreError, CoreResult};

/// Item listings, item pages, search and comments.
#[derive(Clone)]
pub struct ItemService {
    db: Arc<dyn Database>,
}

impl ItemService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    pub async fn add_item(&self, owner_id: i64, draft: ItemDraft) -> CoreResult<Item> {
        validate(&draft)?;
        let available = draft.available.ok_or_else(|| {
            CoreError::ValidationError("available must be set".to_string())
        })?;

        let mut tx = self.db.begin().await?;
        require_user(&mut *tx, owner_id).await?;
        if let Some(request_id) = draft.request_id {
            if tx.find_request(request_id).await?.is_none() {
                return Err(CoreError::missing(format!(
                    "Request with id={} not found",
                    request_id
                )));
            }
        }

        let item = tx
            .insert_item(NewItem {
                name: draft.name,
                description: draft.description,
                available,
                owner_id,
                request_id: draft.request_id,
            })
            .await?;
        tx.commit().await?;

        info!(item_id = item.id, owner_id, "Item created");
        Ok(item)
    }

    pub async fn update_item(
        &self,
        item_id: i64,
        owner_id: i64,
        patch: ItemPatch,
    ) -> CoreResult<Item> {
        validate(&patch)?;

        let mut tx = self.db.begin().await?;
        require_user(&mut *tx, owner_id).await?;
        let mut item = owned_item(&mut *tx, item_id, owner_id).await?;

        item.apply(patch);
        tx.update_item(&item).await?;
        tx.commit().await?;

        info!(item_id, owner_id, "Item updated");
        Ok(item)
    }

    /// Item page. Booking neighbours are only filled in for the owner.
    pub async fn get_item(&self, item_id: i64, user_id: i64) -> CoreResult<ItemDetails> {
        let mut tx = self.db.begin().await?;
        require_user(&mut *tx, user_id).await?;
        let item = tx
            .find_item(item_id)
            .await?
            .ok_or_else(|| item_not_found(item_id))?;

        let bookings = if item.owner_id == user_id {
            tx.find_bookings_for_items(&[item_id]).await?
        } else {
            Vec::new()
        };
        let comments = comment_views(&mut *tx, &[item_id]).await?;
        tx.commit().await?;

        Ok(ItemDetails::assemble(item, &comments, &bookings, current_time()))
    }

    pub async fn list_owner_items(&self, owner_id: i64, page: Page) -> CoreResult<Vec<ItemDetails>> {
        let mut tx = self.db.begin().await?;
        require_user(&mut *tx, owner_id).await?;

        let items = tx.list_items_by_owner(owner_id, page).await?;
        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        let bookings = tx.find_bookings_for_items(&ids).await?;
        let comments = comment_views(&mut *tx, &ids).await?;
        tx.commit().await?;

        let now = current_time();
        Ok(items
            .into_iter()
            .map(|item| ItemDetails::assemble(item, &comments, &bookings, now))
            .collect())
    }

    /// Blank text matches nothing rather than everything.
    pub async fn search_items(&self, user_id: i64, text: &str, page: Page) -> CoreResult<Vec<Item>> {
        let mut tx = self.db.begin().await?;
        require_user(&mut *tx, user_id).await?;
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let items = tx.search_available_items(text, page).await?;
        tx.commit().await?;
        Ok(items)
    }

    pub async fn delete_item(&self, item_id: i64, owner_id: i64) -> CoreResult<Item> {
        let mut tx = self.db.begin().await?;
        require_user(&mut *tx, owner_id).await?;
        let item = owned_item(&mut *tx, item_id, owner_id).await?;
        tx.delete_item(item_id).await?;
        tx.commit().await?;

        info!(item_id, owner_id, "Item deleted");
        Ok(item)
    }

    /// Only someone who actually borrowed the item, and whose approved
    /// booking is over, may comment on it.
    pub async fn add_comment(
        &self,
        item_id: i64,
        author_id: i64,
        draft: CommentDraft,
    ) -> CoreResult<CommentView> {
        validate(&draft)?;

        let mut tx = self.db.begin().await?;
        let author = tx
            .find_user(author_id)
            .await?
            .ok_or_else(|| CoreError::user_not_found(author_id))?;
        if tx.find_item(item_id).await?.is_none() {
            return Err(item_not_found(item_id));
        }

        let now = current_time();
        if !tx.has_finished_approved_booking(author_id, item_id, now).await? {
            warn!(item_id, author_id, "Comment rejected: no finished booking");
            return Err(CoreError::NotAvailable(format!(
                "Not available comment for user with id={}",
                author_id
            )));
        }

        let comment = tx
            .insert_comment(NewComment {
                text: draft.text,
                item_id,
                author_id,
                created: now,
            })
            .await?;
        tx.commit().await?;

        info!(comment_id = comment.id, item_id, author_id, "Comment added");
        Ok(CommentView {
            id: comment.id,
            text: comment.text,
            author_name: author.name,
            created: comment.created,
        })
    }
}

/// Missing and foreign items are reported identically.
async fn owned_item(tx: &mut dyn UnitOfWork, item_id: i64, owner_id: i64) -> CoreResult<Item> {
    match tx.find_owned_item(item_id, owner_id).await? {
        Some(item) => Ok(item),
        None => {
            warn!(item_id, owner_id, "Item not owned by user");
            Err(CoreError::denied(format!(
                "User with id={} does not have item with id={}",
                owner_id, item_id
            )))
        }
    }
}

fn item_not_found(item_id: i64) -> CoreError {
    CoreError::missing(format!("Item with id={} not found", item_id))
}

/// Comments of `item_ids` keyed by item, with author names resolved.
async fn comment_views(
    tx: &mut dyn UnitOfWork,
    item_ids: &[i64],
) -> CoreResult<Vec<(i64, CommentView)>> {
    let comments = tx.find_comments_by_items(item_ids).await?;
    let author_ids: Vec<i64> = comments.iter().map(|c| c.author_id).collect();
    let names: HashMap<i64, String> = tx
        .find_users(&author_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();

    Ok(comments
        .into_iter()
        .map(|c| {
            let author_name = names.get(&c.author_id).cloned().unwrap_or_default();
            (
                c.item_id,
                CommentView {
                    id: c.id,
                    text: c.text,
                    author_name,
                    created: c.created,
                },
            )
        })
        .collect())
}
