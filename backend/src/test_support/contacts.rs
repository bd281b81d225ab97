//! In-memory contact repository mirroring the SQL adapter's ordering and its
//! per-owner unique email and phone indexes.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{ContactRepository, ContactRepositoryError};
use crate::domain::{
    Contact, ContactDraft, ContactId, EmailAddress, MonthDay, Pagination, SearchTerm, UserId,
};

#[derive(Default)]
struct Rows {
    last_id: i64,
    contacts: BTreeMap<i64, Contact>,
}

/// Contact repository keyed by id; every lookup filters on owner.
#[derive(Default)]
pub struct InMemoryContactRepository {
    rows: Mutex<Rows>,
}

fn page_of(contacts: impl Iterator<Item = Contact>, page: Pagination) -> Vec<Contact> {
    contacts
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

impl Rows {
    fn clashes(&self, candidate: &Contact, skip: Option<i64>) -> bool {
        self.contacts.values().any(|stored| {
            Some(stored.id.get()) != skip
                && stored.owner == candidate.owner
                && ((stored.email.is_some() && stored.email == candidate.email)
                    || (stored.phone.is_some() && stored.phone == candidate.phone))
        })
    }
}

impl InMemoryContactRepository {
    fn lock(&self) -> MutexGuard<'_, Rows> {
        match self.rows.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("contact repository mutex poisoned"),
        }
    }

    fn owned_by(&self, owner: &UserId) -> Vec<Contact> {
        self.lock()
            .contacts
            .values()
            .filter(|contact| &contact.owner == owner)
            .cloned()
            .collect()
    }

    /// Number of stored contacts across all owners.
    pub fn len(&self) -> usize {
        self.lock().contacts.len()
    }

    /// True when no contacts are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn create(
        &self,
        owner: &UserId,
        draft: &ContactDraft,
        now: DateTime<Utc>,
    ) -> Result<Contact, ContactRepositoryError> {
        let mut rows = self.lock();
        let id = ContactId::new(rows.last_id + 1)
            .map_err(|err| ContactRepositoryError::query(err.to_string()))?;
        let contact = Contact::from_draft(id, *owner, draft.clone(), now);
        if rows.clashes(&contact, None) {
            return Err(ContactRepositoryError::duplicate());
        }
        rows.last_id = id.get();
        rows.contacts.insert(id.get(), contact.clone());
        Ok(contact)
    }

    async fn list(
        &self,
        owner: &UserId,
        page: Pagination,
    ) -> Result<Vec<Contact>, ContactRepositoryError> {
        Ok(page_of(self.owned_by(owner).into_iter(), page))
    }

    async fn find(
        &self,
        owner: &UserId,
        id: ContactId,
    ) -> Result<Option<Contact>, ContactRepositoryError> {
        Ok(self
            .lock()
            .contacts
            .get(&id.get())
            .filter(|contact| &contact.owner == owner)
            .cloned())
    }

    async fn update(&self, contact: &Contact) -> Result<Option<Contact>, ContactRepositoryError> {
        let mut rows = self.lock();
        if rows.clashes(contact, Some(contact.id.get())) {
            return Err(ContactRepositoryError::duplicate());
        }
        let Some(stored) = rows
            .contacts
            .get_mut(&contact.id.get())
            .filter(|stored| stored.owner == contact.owner)
        else {
            return Ok(None);
        };
        *stored = Contact {
            created_at: stored.created_at,
            ..contact.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, owner: &UserId, id: ContactId) -> Result<bool, ContactRepositoryError> {
        let mut rows = self.lock();
        let owned = rows
            .contacts
            .get(&id.get())
            .is_some_and(|contact| &contact.owner == owner);
        if owned {
            rows.contacts.remove(&id.get());
        }
        Ok(owned)
    }

    async fn search(
        &self,
        owner: &UserId,
        term: &SearchTerm,
        page: Pagination,
    ) -> Result<Vec<Contact>, ContactRepositoryError> {
        let mut matches: Vec<Contact> = self
            .owned_by(owner)
            .into_iter()
            .filter(|contact| contact.matches(term))
            .collect();
        matches.sort_by(|a, b| a.first_name.cmp(&b.first_name).then(a.id.cmp(&b.id)));
        Ok(page_of(matches.into_iter(), page))
    }

    async fn with_birthdays_on(
        &self,
        owner: &UserId,
        days: &[MonthDay],
    ) -> Result<Vec<Contact>, ContactRepositoryError> {
        Ok(self
            .owned_by(owner)
            .into_iter()
            .filter(|contact| contact.has_birthday_in(days))
            .collect())
    }

    async fn find_by_email(
        &self,
        owner: &UserId,
        email: &EmailAddress,
    ) -> Result<Option<Contact>, ContactRepositoryError> {
        Ok(self
            .owned_by(owner)
            .into_iter()
            .find(|contact| contact.email.as_ref() == Some(email)))
    }

    async fn find_by_phone(
        &self,
        owner: &UserId,
        phone: &str,
    ) -> Result<Option<Contact>, ContactRepositoryError> {
        Ok(self
            .owned_by(owner)
            .into_iter()
            .find(|contact| contact.phone.as_deref() == Some(phone)))
    }
}
