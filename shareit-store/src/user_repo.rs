use async_trait::async_trait;
use shareit_core::models::{NewUser, User};
use shareit_core::repository::UserStore;
use shareit_core::{CoreError, CoreResult};

use crate::database::{store_error, PgUnitOfWork};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

#[async_trait]
impl UserStore for PgUnitOfWork {
    async fn insert_user(&mut self, user: NewUser) -> CoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id, name, email",
        )
        .bind(&user.name)
        .bind(&user.email)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(row.into())
    }

    async fn find_user(&mut self, id: i64) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(row.map(User::from))
    }

    async fn find_users(&mut self, ids: &[i64]) -> CoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn user_exists(&mut self, id: i64) -> CoreResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(store_error)
    }

    async fn email_taken(&mut self, email: &str, except: Option<i64>) -> CoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(except)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_error)
    }

    async fn list_users(&mut self) -> CoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT id, name, email FROM users ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_user(&mut self, user: &User) -> CoreResult<()> {
        let result = sqlx::query("UPDATE users SET name = $2, email = $3 WHERE id = $1")
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .execute(&mut *self.tx)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::StoreError(format!("no user row {}", user.id)));
        }
        Ok(())
    }

    /// Items, bookings, comments and requests go with the user through the
    /// foreign keys' `ON DELETE` rules.
    async fn delete_user(&mut self, id: i64) -> CoreResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
