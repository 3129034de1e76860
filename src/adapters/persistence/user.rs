use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::AppResult,
    application::use_cases::user::UserRepo,
    domain::entities::user::{User, UserRole},
};

fn row_to_user(row: sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: UserRole::from_str(row.get::<String, _>("role").as_str()),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str = "id, name, email, password_hash, role, created_at";

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> AppResult<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (id, name, email, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {SELECT_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.pool())
        .await?;
        Ok(row_to_user(row))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(row_to_user))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(row_to_user))
    }

    async fn update_profile(&self, id: Uuid, name: &str, email: &str) -> AppResult<User> {
        let row = sqlx::query(&format!(
            "UPDATE users SET name = $2, email = $3 WHERE id = $1 RETURNING {SELECT_COLS}"
        ))
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_one(self.pool())
        .await?;
        Ok(row_to_user(row))
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(row_to_user).collect())
    }

    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let row = sqlx::query(&format!(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING {SELECT_COLS}"
        ))
        .bind(id)
        .bind(role.as_str())
        .fetch_one(self.pool())
        .await?;
        Ok(row_to_user(row))
    }
}
