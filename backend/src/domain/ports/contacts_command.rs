//! Driving port for contact mutations.
//!
//! Payloads arrive as raw [`ContactFields`]; validation happens behind the
//! port because the birthday rule depends on the service clock.

use async_trait::async_trait;

use crate::domain::{Contact, ContactFields, ContactId, Error, UserId};

/// Domain use-case port for creating, updating and deleting contacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactsCommand: Send + Sync {
    /// Create a contact owned by `owner`.
    async fn create(&self, owner: &UserId, fields: ContactFields) -> Result<Contact, Error>;

    /// Apply the present fields to an existing contact.
    async fn update(
        &self,
        owner: &UserId,
        id: ContactId,
        fields: ContactFields,
    ) -> Result<Contact, Error>;

    /// Remove a contact.
    async fn delete(&self, owner: &UserId, id: ContactId) -> Result<(), Error>;
}
