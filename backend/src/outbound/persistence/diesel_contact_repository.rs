//! PostgreSQL-backed `ContactRepository` implementation using Diesel ORM.
//!
//! Every statement filters on `user_id`, so one owner can never read or
//! mutate another owner's rows even when ids are guessed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Date, Nullable, Text};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ContactRepository, ContactRepositoryError};
use crate::domain::{
    Contact, ContactDraft, ContactId, EmailAddress, MonthDay, Pagination, SearchTerm, UserId,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{ContactRow, ContactUpdate, NewContactRow};
use super::pool::{DbPool, PoolError};
use super::schema::contacts;

diesel::define_sql_function! {
    /// PostgreSQL `to_char`, used to project birthdays onto `MM-DD`.
    fn to_char(value: Nullable<Date>, format: Text) -> Nullable<Text>;
}

const MONTH_DAY_FORMAT: &str = "MM-DD";

/// Diesel-backed implementation of the `ContactRepository` port.
#[derive(Clone)]
pub struct DieselContactRepository {
    pool: DbPool,
}

impl DieselContactRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ContactRepositoryError {
    ContactRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> ContactRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => ContactRepositoryError::connection(message),
        DieselFailure::UniqueViolation => ContactRepositoryError::duplicate(),
        DieselFailure::Query(message) => ContactRepositoryError::query(message),
    }
}

fn row_to_contact(row: ContactRow) -> Result<Contact, ContactRepositoryError> {
    Contact::try_from(row).map_err(ContactRepositoryError::query)
}

fn rows_to_contacts(rows: Vec<ContactRow>) -> Result<Vec<Contact>, ContactRepositoryError> {
    rows.into_iter().map(row_to_contact).collect()
}

#[async_trait]
impl ContactRepository for DieselContactRepository {
    async fn create(
        &self,
        owner: &UserId,
        draft: &ContactDraft,
        now: DateTime<Utc>,
    ) -> Result<Contact, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: ContactRow = diesel::insert_into(contacts::table)
            .values(NewContactRow::new(owner, draft, now))
            .returning(ContactRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_contact(row)
    }

    async fn list(
        &self,
        owner: &UserId,
        page: Pagination,
    ) -> Result<Vec<Contact>, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ContactRow> = contacts::table
            .filter(contacts::user_id.eq(owner.as_uuid()))
            .order(contacts::id.asc())
            .limit(i64::from(page.limit()))
            .offset(i64::from(page.offset()))
            .select(ContactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_contacts(rows)
    }

    async fn find(
        &self,
        owner: &UserId,
        id: ContactId,
    ) -> Result<Option<Contact>, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ContactRow> = contacts::table
            .filter(contacts::id.eq(id.get()))
            .filter(contacts::user_id.eq(owner.as_uuid()))
            .select(ContactRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_contact).transpose()
    }

    async fn update(&self, contact: &Contact) -> Result<Option<Contact>, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let target = contacts::table
            .filter(contacts::id.eq(contact.id.get()))
            .filter(contacts::user_id.eq(contact.owner.as_uuid()));
        let row: Option<ContactRow> = diesel::update(target)
            .set(ContactUpdate::from(contact))
            .returning(ContactRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_contact).transpose()
    }

    async fn delete(&self, owner: &UserId, id: ContactId) -> Result<bool, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let target = contacts::table
            .filter(contacts::id.eq(id.get()))
            .filter(contacts::user_id.eq(owner.as_uuid()));
        let deleted = diesel::delete(target)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn search(
        &self,
        owner: &UserId,
        term: &SearchTerm,
        page: Pagination,
    ) -> Result<Vec<Contact>, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let pattern = term.like_pattern();

        let rows: Vec<ContactRow> = contacts::table
            .filter(contacts::user_id.eq(owner.as_uuid()))
            .filter(
                contacts::first_name
                    .nullable()
                    .ilike(pattern.clone())
                    .or(contacts::last_name.ilike(pattern.clone()))
                    .or(contacts::email.ilike(pattern)),
            )
            .order((contacts::first_name.asc(), contacts::id.asc()))
            .limit(i64::from(page.limit()))
            .offset(i64::from(page.offset()))
            .select(ContactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_contacts(rows)
    }

    async fn with_birthdays_on(
        &self,
        owner: &UserId,
        days: &[MonthDay],
    ) -> Result<Vec<Contact>, ContactRepositoryError> {
        if days.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let keys: Vec<String> = days.iter().map(|day| day.key()).collect();

        let rows: Vec<ContactRow> = contacts::table
            .filter(contacts::user_id.eq(owner.as_uuid()))
            .filter(to_char(contacts::birthday, MONTH_DAY_FORMAT).eq_any(keys))
            .order(contacts::id.asc())
            .select(ContactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_contacts(rows)
    }

    async fn find_by_email(
        &self,
        owner: &UserId,
        email: &EmailAddress,
    ) -> Result<Option<Contact>, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ContactRow> = contacts::table
            .filter(contacts::user_id.eq(owner.as_uuid()))
            .filter(contacts::email.eq(email.as_str()))
            .select(ContactRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_contact).transpose()
    }

    async fn find_by_phone(
        &self,
        owner: &UserId,
        phone: &str,
    ) -> Result<Option<Contact>, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ContactRow> = contacts::table
            .filter(contacts::user_id.eq(owner.as_uuid()))
            .filter(contacts::phone.eq(phone))
            .select(ContactRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_contact).transpose()
    }
}
