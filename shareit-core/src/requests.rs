use shareit_shared::Page;
use std::sync::Arc;
use tracing::info;

use crate::models::{current_time, ItemRequest, ItemRequestView, NewItemRequest, RequestDraft};
use crate::repository::{Database, ItemStore, RequestStore, UnitOfWork};
use crate::users::require_user;
use crate::validation::validate;
use crate::{CoreError, CoreResult};

/// Requests for items nobody has listed yet.
#[derive(Clone)]
pub struct RequestService {
    db: Arc<dyn Database>,
}

impl RequestService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    pub async fn add_request(&self, user_id: i64, draft: RequestDraft) -> CoreResult<ItemRequestView> {
        validate(&draft)?;

        let mut tx = self.db.begin().await?;
        require_user(&mut *tx, user_id).await?;
        let request = tx
            .insert_request(NewItemRequest {
                description: draft.description,
                requester_id: user_id,
                created: current_time(),
            })
            .await?;
        tx.commit().await?;

        info!(request_id = request.id, user_id, "Item request created");
        Ok(ItemRequestView {
            request,
            items: Vec::new(),
        })
    }

    pub async fn list_own_requests(&self, user_id: i64) -> CoreResult<Vec<ItemRequestView>> {
        let mut tx = self.db.begin().await?;
        require_user(&mut *tx, user_id).await?;
        let requests = tx.list_requests_by_requester(user_id).await?;
        let views = with_items(&mut *tx, requests).await?;
        tx.commit().await?;
        Ok(views)
    }

    pub async fn get_request(&self, user_id: i64, request_id: i64) -> CoreResult<ItemRequestView> {
        let mut tx = self.db.begin().await?;
        require_user(&mut *tx, user_id).await?;
        let request = tx
            .find_request(request_id)
            .await?
            .ok_or_else(|| CoreError::missing(format!("Request with id={} not found", request_id)))?;
        let view = with_items(&mut *tx, vec![request])
            .await?
            .pop()
            .ok_or_else(|| CoreError::StoreError("request vanished".to_string()))?;
        tx.commit().await?;
        Ok(view)
    }

    /// Everybody else's requests, newest first.
    pub async fn list_other_requests(
        &self,
        user_id: i64,
        page: Page,
    ) -> CoreResult<Vec<ItemRequestView>> {
        let mut tx = self.db.begin().await?;
        require_user(&mut *tx, user_id).await?;
        let requests = tx.list_requests_of_others(user_id, page).await?;
        let views = with_items(&mut *tx, requests).await?;
        tx.commit().await?;
        Ok(views)
    }
}

async fn with_items(
    tx: &mut dyn UnitOfWork,
    requests: Vec<ItemRequest>,
) -> CoreResult<Vec<ItemRequestView>> {
    let ids: Vec<i64> = requests.iter().map(|r| r.id).collect();
    let items = tx.find_items_by_requests(&ids).await?;

    Ok(requests
        .into_iter()
        .map(|request| {
            let answers = items
                .iter()
                .filter(|i| i.request_id == Some(request.id))
                .cloned()
                .collect();
            ItemRequestView {
                request,
                items: answers,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDatabase;
    use crate::models::{ItemDraft, NewUser, User};
    use crate::repository::UserStore;
    use crate::ItemService;

    fn draft(description: &str) -> RequestDraft {
        RequestDraft {
            description: description.to_string(),
        }
    }

    async fn user(db: &MemoryDatabase, name: &str) -> User {
        let mut tx = db.begin().await.unwrap();
        let user = tx
            .insert_user(NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_requests_with_answering_items() {
        let db = Arc::new(MemoryDatabase::new());
        let asker = user(&db, "Asker").await;
        let lender = user(&db, "Lender").await;
        let requests = RequestService::new(db.clone());
        let items = ItemService::new(db.clone());

        let first = requests
            .add_request(asker.id, draft("Need a ladder"))
            .await
            .unwrap();
        let second = requests
            .add_request(asker.id, draft("Need a tent"))
            .await
            .unwrap();

        let ladder = items
            .add_item(
                lender.id,
                ItemDraft {
                    name: "Ladder".to_string(),
                    description: "Three metres".to_string(),
                    available: Some(true),
                    request_id: Some(first.request.id),
                },
            )
            .await
            .unwrap();

        let own = requests.list_own_requests(asker.id).await.unwrap();
        let ids: Vec<i64> = own.iter().map(|v| v.request.id).collect();
        assert_eq!(ids, vec![second.request.id, first.request.id]);
        assert_eq!(own[1].items, vec![ladder.clone()]);
        assert!(own[0].items.is_empty());

        let fetched = requests.get_request(lender.id, first.request.id).await.unwrap();
        assert_eq!(fetched.items, vec![ladder]);

        let others = requests
            .list_other_requests(lender.id, Page::new(0, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].request.id, second.request.id);

        assert!(requests
            .list_other_requests(asker.id, Page::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_request_errors() {
        let db = Arc::new(MemoryDatabase::new());
        let asker = user(&db, "Asker").await;
        let requests = RequestService::new(db.clone());

        assert!(matches!(
            requests.add_request(asker.id, draft("  ")).await,
            Err(CoreError::ValidationError(_))
        ));
        assert!(matches!(
            requests.add_request(999, draft("Need a tent")).await,
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(
            requests.get_request(asker.id, 999).await,
            Err(CoreError::NotFound { .. })
        ));
    }
}
