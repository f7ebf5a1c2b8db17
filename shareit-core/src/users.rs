use shareit_shared::Masked;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{NewUser, User, UserPatch};
use crate::repository::{Database, UnitOfWork, UserStore};
use crate::validation::validate;
use crate::{CoreError, CoreResult};

#[derive(Clone)]
pub struct UserService {
    db: Arc<dyn Database>,
}

impl UserService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    pub async fn add_user(&self, user: NewUser) -> CoreResult<User> {
        validate(&user)?;

        let mut tx = self.db.begin().await?;
        if tx.email_taken(&user.email, None).await? {
            warn!(email = %Masked(&user.email), "Rejected duplicate email");
            return Err(duplicate_email(&user.email));
        }
        let user = tx.insert_user(user).await?;
        tx.commit().await?;

        info!(user_id = user.id, email = %Masked(&user.email), "User created");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i64) -> CoreResult<User> {
        let mut tx = self.db.begin().await?;
        let user = tx
            .find_user(user_id)
            .await?
            .ok_or_else(|| not_found(user_id))?;
        tx.commit().await?;
        Ok(user)
    }

    pub async fn list_users(&self) -> CoreResult<Vec<User>> {
        let mut tx = self.db.begin().await?;
        let users = tx.list_users().await?;
        tx.commit().await?;
        Ok(users)
    }

    pub async fn update_user(&self, user_id: i64, patch: UserPatch) -> CoreResult<User> {
        validate(&patch)?;

        let mut tx = self.db.begin().await?;
        let mut user = tx
            .find_user(user_id)
            .await?
            .ok_or_else(|| not_found(user_id))?;

        if let Some(email) = &patch.email {
            if tx.email_taken(email, Some(user_id)).await? {
                warn!(user_id, email = %Masked(email), "Rejected duplicate email");
                return Err(duplicate_email(email));
            }
        }

        user.apply(patch);
        tx.update_user(&user).await?;
        tx.commit().await?;

        info!(user_id, "User updated");
        Ok(user)
    }

    /// Removes the user and everything hanging off them; returns the removed row.
    pub async fn delete_user(&self, user_id: i64) -> CoreResult<User> {
        let mut tx = self.db.begin().await?;
        let user = tx
            .find_user(user_id)
            .await?
            .ok_or_else(|| not_found(user_id))?;
        tx.delete_user(user_id).await?;
        tx.commit().await?;

        info!(user_id, "User deleted");
        Ok(user)
    }
}

pub(crate) async fn require_user(tx: &mut dyn UnitOfWork, user_id: i64) -> CoreResult<()> {
    if tx.user_exists(user_id).await? {
        Ok(())
    } else {
        Err(CoreError::user_not_found(user_id))
    }
}

fn not_found(user_id: i64) -> CoreError {
    CoreError::missing(format!("User id={} not found", user_id))
}

fn duplicate_email(email: &str) -> CoreError {
    CoreError::Conflict(format!("User with email {} already exists", email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDatabase;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryDatabase::new()))
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_and_get_user() {
        let users = service();
        let created = users
            .add_user(new_user("Ann", "ann@example.com"))
            .await
            .unwrap();

        assert_eq!(users.get_user(created.id).await.unwrap(), created);
        assert_eq!(users.list_users().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let users = service();
        assert!(matches!(
            users.add_user(new_user(" ", "ann@example.com")).await,
            Err(CoreError::ValidationError(_))
        ));
        assert!(matches!(
            users.add_user(new_user("Ann", "not-an-email")).await,
            Err(CoreError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let users = service();
        let ann = users
            .add_user(new_user("Ann", "ann@example.com"))
            .await
            .unwrap();
        let bob = users
            .add_user(new_user("Bob", "bob@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            users.add_user(new_user("Ann 2", "ann@example.com")).await,
            Err(CoreError::Conflict(_))
        ));

        let taken = UserPatch {
            email: Some("ann@example.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            users.update_user(bob.id, taken.clone()).await,
            Err(CoreError::Conflict(_))
        ));

        // Re-submitting one's own address is not a conflict.
        assert!(users.update_user(ann.id, taken).await.is_ok());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let users = service();
        let ann = users
            .add_user(new_user("Ann", "ann@example.com"))
            .await
            .unwrap();

        let updated = users
            .update_user(
                ann.id,
                UserPatch {
                    name: Some("Annie".to_string()),
                    email: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Annie");
        assert_eq!(updated.email, "ann@example.com");
        assert_eq!(users.get_user(ann.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let users = service();
        let ann = users
            .add_user(new_user("Ann", "ann@example.com"))
            .await
            .unwrap();

        assert_eq!(users.delete_user(ann.id).await.unwrap(), ann);
        assert!(matches!(
            users.get_user(ann.id).await,
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(
            users.delete_user(ann.id).await,
            Err(CoreError::NotFound { .. })
        ));
    }
}
