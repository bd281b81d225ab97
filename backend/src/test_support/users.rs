//! In-memory user repository.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, NewUser, User, UserId};

/// User repository backed by a `HashMap`, enforcing unique emails.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, User>> {
        match self.users.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("user repository mutex poisoned"),
        }
    }

    /// Insert or replace a record directly.
    pub fn insert(&self, user: User) {
        self.lock().insert(user.id, user);
    }

    /// Snapshot of the record owning `email`.
    pub fn get_by_email(&self, email: &str) -> Option<User> {
        self.lock()
            .values()
            .find(|user| user.email.as_str() == email)
            .cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut users = self.lock();
        if users.values().any(|existing| existing.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_str()));
        }
        let record = User {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            avatar: user.avatar.clone(),
            confirmed: false,
            refresh_token: None,
            role: user.role,
            created_at: Utc::now(),
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.get_by_email(email.as_str()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().get(id).cloned())
    }

    async fn update_refresh_token(
        &self,
        id: &UserId,
        token: Option<String>,
    ) -> Result<(), UserPersistenceError> {
        if let Some(user) = self.lock().get_mut(id) {
            user.refresh_token = token;
        }
        Ok(())
    }

    async fn mark_confirmed(&self, email: &EmailAddress) -> Result<(), UserPersistenceError> {
        if let Some(user) = self
            .lock()
            .values_mut()
            .find(|user| &user.email == email)
        {
            user.confirmed = true;
        }
        Ok(())
    }

    async fn update_avatar(
        &self,
        id: &UserId,
        avatar_url: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut users = self.lock();
        Ok(users.get_mut(id).map(|user| {
            user.avatar = Some(avatar_url.to_owned());
            user.clone()
        }))
    }
}
