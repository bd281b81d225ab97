//! Contact domain service.
//!
//! Implements both contact driving ports. Validation of raw payloads happens
//! here because the birthday rule depends on the injected clock.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    ContactRepository, ContactRepositoryError, ContactsCommand, ContactsQuery,
};
use crate::domain::{
    Contact, ContactDraft, ContactFields, ContactId, ContactPatch, ContactValidationError,
    EmailAddress, Error, Pagination, SearchTerm, UserId, birthday_window,
};

const CONTACT_NOT_FOUND: &str = "Contact not found";
const CONTACT_EXISTS: &str = "Contact already exists";

/// Contact service implementing [`ContactsCommand`] and [`ContactsQuery`].
#[derive(Clone)]
pub struct ContactsService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ContactsService<R> {
    /// Create a new service with the given repository and clock.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }
}

fn map_repository_error(error: ContactRepositoryError) -> Error {
    match error {
        ContactRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("contact repository unavailable: {message}"))
        }
        ContactRepositoryError::Query { message } => {
            Error::internal(format!("contact repository error: {message}"))
        }
        ContactRepositoryError::Duplicate => Error::conflict(CONTACT_EXISTS),
    }
}

/// Convert a validation failure into a 400 naming the offending field.
pub(crate) fn invalid_contact(error: ContactValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": "validation_error",
    }))
}

impl<R> ContactsService<R>
where
    R: ContactRepository,
{
    /// Reject when another contact of `owner` already uses the email or
    /// phone. `current` is skipped so a contact never conflicts with itself.
    async fn ensure_unique(
        &self,
        owner: &UserId,
        email: Option<&EmailAddress>,
        phone: Option<&str>,
        current: Option<ContactId>,
    ) -> Result<(), Error> {
        let is_other = |found: Option<Contact>| found.is_some_and(|c| Some(c.id) != current);

        if let Some(email) = email {
            let found = self
                .repo
                .find_by_email(owner, email)
                .await
                .map_err(map_repository_error)?;
            if is_other(found) {
                return Err(Error::conflict(CONTACT_EXISTS));
            }
        }
        if let Some(phone) = phone {
            let found = self
                .repo
                .find_by_phone(owner, phone)
                .await
                .map_err(map_repository_error)?;
            if is_other(found) {
                return Err(Error::conflict(CONTACT_EXISTS));
            }
        }
        Ok(())
    }

    async fn find_owned(&self, owner: &UserId, id: ContactId) -> Result<Contact, Error> {
        self.repo
            .find(owner, id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(CONTACT_NOT_FOUND))
    }
}

#[async_trait]
impl<R> ContactsCommand for ContactsService<R>
where
    R: ContactRepository,
{
    async fn create(&self, owner: &UserId, fields: ContactFields) -> Result<Contact, Error> {
        let draft = ContactDraft::try_new(fields, self.today()).map_err(invalid_contact)?;
        self.ensure_unique(owner, draft.email.as_ref(), draft.phone.as_deref(), None)
            .await?;
        let contact = self
            .repo
            .create(owner, &draft, self.clock.utc())
            .await
            .map_err(map_repository_error)?;
        info!(contact_id = %contact.id, "contact created");
        Ok(contact)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: ContactId,
        fields: ContactFields,
    ) -> Result<Contact, Error> {
        let patch = ContactPatch::try_new(fields, self.today()).map_err(invalid_contact)?;
        let mut contact = self.find_owned(owner, id).await?;
        self.ensure_unique(owner, patch.new_email(), patch.new_phone(), Some(id))
            .await?;

        contact.apply(&patch, self.clock.utc());
        self.repo
            .update(&contact)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(CONTACT_NOT_FOUND))
    }

    async fn delete(&self, owner: &UserId, id: ContactId) -> Result<(), Error> {
        let deleted = self
            .repo
            .delete(owner, id)
            .await
            .map_err(map_repository_error)?;
        if !deleted {
            return Err(Error::not_found(CONTACT_NOT_FOUND));
        }
        info!(contact_id = %id, "contact deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> ContactsQuery for ContactsService<R>
where
    R: ContactRepository,
{
    async fn list(&self, owner: &UserId, page: Pagination) -> Result<Vec<Contact>, Error> {
        self.repo
            .list(owner, page)
            .await
            .map_err(map_repository_error)
    }

    async fn get(&self, owner: &UserId, id: ContactId) -> Result<Contact, Error> {
        self.find_owned(owner, id).await
    }

    async fn search(
        &self,
        owner: &UserId,
        term: &SearchTerm,
        page: Pagination,
    ) -> Result<Vec<Contact>, Error> {
        self.repo
            .search(owner, term, page)
            .await
            .map_err(map_repository_error)
    }

    async fn upcoming_birthdays(&self, owner: &UserId) -> Result<Vec<Contact>, Error> {
        let window = birthday_window(self.today());
        self.repo
            .with_birthdays_on(owner, &window)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "contacts_service_tests.rs"]
mod tests;
