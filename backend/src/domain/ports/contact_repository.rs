//! Port for contact persistence.
//!
//! Every method takes the owner's [`UserId`]; adapters must filter on it so
//! a user only ever reaches their own rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Contact, ContactDraft, ContactId, EmailAddress, MonthDay, Pagination, SearchTerm, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by contact repository adapters.
    pub enum ContactRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "contact repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "contact repository query failed: {message}",
        /// Another contact of the same owner already uses the email or phone.
        Duplicate => "contact with the same email or phone already exists",
    }
}

/// Storage for contacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Insert a contact for `owner`, stamping both timestamps with `now`.
    async fn create(
        &self,
        owner: &UserId,
        draft: &ContactDraft,
        now: DateTime<Utc>,
    ) -> Result<Contact, ContactRepositoryError>;

    /// Page through the owner's contacts ordered by id.
    async fn list(
        &self,
        owner: &UserId,
        page: Pagination,
    ) -> Result<Vec<Contact>, ContactRepositoryError>;

    /// Fetch one contact.
    async fn find(
        &self,
        owner: &UserId,
        id: ContactId,
    ) -> Result<Option<Contact>, ContactRepositoryError>;

    /// Overwrite the mutable columns of an existing contact.
    ///
    /// Returns `None` when the row vanished between read and write.
    async fn update(&self, contact: &Contact) -> Result<Option<Contact>, ContactRepositoryError>;

    /// Delete a contact. Returns `false` when nothing matched.
    async fn delete(&self, owner: &UserId, id: ContactId) -> Result<bool, ContactRepositoryError>;

    /// Case-insensitive match on first name, last name or email, ordered by
    /// first name.
    async fn search(
        &self,
        owner: &UserId,
        term: &SearchTerm,
        page: Pagination,
    ) -> Result<Vec<Contact>, ContactRepositoryError>;

    /// Contacts whose birthday month/day is one of `days`.
    async fn with_birthdays_on(
        &self,
        owner: &UserId,
        days: &[MonthDay],
    ) -> Result<Vec<Contact>, ContactRepositoryError>;

    /// Contact of `owner` using `email`, if any.
    async fn find_by_email(
        &self,
        owner: &UserId,
        email: &EmailAddress,
    ) -> Result<Option<Contact>, ContactRepositoryError>;

    /// Contact of `owner` using `phone`, if any.
    async fn find_by_phone(
        &self,
        owner: &UserId,
        phone: &str,
    ) -> Result<Option<Contact>, ContactRepositoryError>;
}
