use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::jwt,
    domain::entities::user::{User, UserRole},
};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: NaiveDateTime,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> AppResult<User>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn update_profile(&self, id: Uuid, name: &str, email: &str) -> AppResult<User>;
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> AppResult<()>;
    async fn list(&self) -> AppResult<Vec<User>>;
    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User>;
}

#[derive(Clone)]
pub struct UserUseCases {
    users: Arc<dyn UserRepo>,
    jwt_secret: secrecy::SecretString,
    token_ttl: time::Duration,
}

impl UserUseCases {
    pub fn new(
        users: Arc<dyn UserRepo>,
        jwt_secret: secrecy::SecretString,
        token_ttl: time::Duration,
    ) -> Self {
        Self {
            users,
            jwt_secret,
            token_ttl,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn register(&self, input: &RegisterInput) -> AppResult<AuthResponse> {
        let name = input.name.trim();
        let email = input.email.trim().to_lowercase();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Name is required".into()));
        }
        if !email.contains('@') {
            return Err(AppError::InvalidInput("A valid email is required".into()));
        }
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self.users.create(name, &email, &password_hash).await?;
        self.issue_token(&user)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthResponse> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;
        if !verify_password(password, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }
        self.issue_token(&user)
    }

    pub async fn profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(UserProfile::from(&user))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: &UpdateProfileInput,
    ) -> AppResult<UserProfile> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let name = input.name.as_deref().map(str::trim).unwrap_or(&user.name);
        let email = input
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .unwrap_or_else(|| user.email.clone());
        if name.is_empty() {
            return Err(AppError::InvalidInput("Name is required".into()));
        }
        if !email.contains('@') {
            return Err(AppError::InvalidInput("A valid email is required".into()));
        }

        let updated = self.users.update_profile(user_id, name, &email).await?;
        Ok(UserProfile::from(&updated))
    }

    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if !verify_password(current_password, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let hash = hash_password(new_password)?;
        self.users.update_password_hash(user_id, &hash).await
    }

    pub async fn list_users(&self) -> AppResult<Vec<UserProfile>> {
        let users = self.users.list().await?;
        Ok(users.iter().map(UserProfile::from).collect())
    }

    pub async fn update_user_role(&self, user_id: Uuid, role: UserRole) -> AppResult<UserProfile> {
        let updated = self.users.update_role(user_id, role).await?;
        Ok(UserProfile::from(&updated))
    }

    fn issue_token(&self, user: &User) -> AppResult<AuthResponse> {
        let token = jwt::issue(user.id, user.role, &self.jwt_secret, self.token_ttl)?;
        Ok(AuthResponse {
            token,
            user: UserProfile::from(user),
        })
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
