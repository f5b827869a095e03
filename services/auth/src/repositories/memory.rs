//! In-memory user store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::Mutex;

use super::UserStore;
use crate::models::{NewUser, User};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    users: HashMap<i64, User>,
}

/// Store backed by a hash map, for tests and local development.
///
/// Enforces the same email uniqueness as the `users` table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the active flag of a stored user. Returns false if unknown.
    pub async fn set_active(&self, id: i64, active: bool) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.users.get_mut(&id) {
            Some(user) => {
                user.is_active = active;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<i64> {
        let mut inner = self.inner.lock().await;

        if inner.users.values().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::UniqueViolation(format!(
                "users_email_key: {}",
                new_user.email
            )));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();

        inner.users.insert(
            id,
            User {
                id,
                email: new_user.email.clone(),
                password_hash: new_user.password_hash.clone(),
                profile: new_user.profile.clone(),
                role: new_user.role,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
        );

        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        Ok(self.inner.lock().await.users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, UserProfile};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            profile: UserProfile {
                first_name: "Ana".to_string(),
                last_name: "Gomez".to_string(),
                phone: None,
                date_of_birth: None,
            },
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = InMemoryUserStore::new();
        let first = store.insert(&new_user("a@example.com")).await.unwrap();
        let second = store.insert(&new_user("b@example.com")).await.unwrap();
        assert!(second > first);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_unique_violation() {
        let store = InMemoryUserStore::new();
        store.insert(&new_user("a@example.com")).await.unwrap();

        let err = store.insert(&new_user("a@example.com")).await.unwrap_err();
        assert!(err.is_unique_violation());

        // Case-sensitive key
        assert!(store.insert(&new_user("A@example.com")).await.is_ok());
    }

    #[tokio::test]
    async fn test_set_active() {
        let store = InMemoryUserStore::new();
        let id = store.insert(&new_user("a@example.com")).await.unwrap();

        assert!(store.set_active(id, false).await);
        assert!(!store.find_by_id(id).await.unwrap().unwrap().is_active);
        assert!(!store.set_active(id + 100, false).await);
    }
}
