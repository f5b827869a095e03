//! User persistence
//!
//! [`UserStore`] is the credential store contract consumed by the
//! [`AuthManager`](crate::AuthManager). Email uniqueness is the store's job:
//! `insert` must fail with `DatabaseError::UniqueViolation` on a duplicate.

use std::sync::Arc;

use async_trait::async_trait;
use common::error::DatabaseResult;

use crate::models::{NewUser, User};

pub mod memory;
pub mod user;

pub use memory::InMemoryUserStore;
pub use user::PgUserRepository;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a user and return its id
    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<i64>;

    /// Find a user by exact email, active or not
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    /// Find a user by id, active or not
    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>>;
}

#[async_trait]
impl<S: UserStore + ?Sized> UserStore for Arc<S> {
    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<i64> {
        (**self).insert(new_user).await
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        (**self).find_by_email(email).await
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        (**self).find_by_id(id).await
    }
}
