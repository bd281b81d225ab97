//! Driving port for contact reads.

use async_trait::async_trait;

use crate::domain::{Contact, ContactId, Error, Pagination, SearchTerm, UserId};

/// Domain use-case port for reading the owner's contacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactsQuery: Send + Sync {
    /// Page through contacts ordered by id.
    async fn list(&self, owner: &UserId, page: Pagination) -> Result<Vec<Contact>, Error>;

    /// Fetch one contact or fail with `not_found`.
    async fn get(&self, owner: &UserId, id: ContactId) -> Result<Contact, Error>;

    /// Search names and email.
    async fn search(
        &self,
        owner: &UserId,
        term: &SearchTerm,
        page: Pagination,
    ) -> Result<Vec<Contact>, Error>;

    /// Contacts with a birthday in the next seven days.
    async fn upcoming_birthdays(&self, owner: &UserId) -> Result<Vec<Contact>, Error>;
}
