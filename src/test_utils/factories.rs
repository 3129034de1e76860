//! Test data factories for creating valid test fixtures.
//!
//! Each factory creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::entities::user::{User, UserRole},
    test_utils::InMemoryPersistence,
};

/// Creates a user with sensible defaults and inserts it into the store.
/// The default `password_hash` is not a valid argon2 hash; tests exercising
/// login go through `UserUseCases::register` instead.
pub async fn create_test_user(
    persistence: &Arc<InMemoryPersistence>,
    overrides: impl FnOnce(&mut User),
) -> User {
    let mut user = User {
        id: Uuid::new_v4(),
        name: "Test User".to_string(),
        email: format!("user-{}@example.com", Uuid::new_v4().simple()),
        password_hash: String::new(),
        role: UserRole::User,
        created_at: Utc::now().naive_utc(),
    };
    overrides(&mut user);
    persistence.insert_user(user.clone());
    user
}
