//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain records re-run the
//! domain validators so corrupt rows surface as query errors rather than
//! panics.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Contact, ContactDraft, ContactId, EmailAddress, NewUser, Role, User, UserId, Username,
};

use super::schema::{contacts, users};

// ---------------------------------------------------------------------------
// User models
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub confirmed: bool,
    pub refresh_token: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub avatar: Option<&'a str>,
    pub role: &'a str,
}

impl<'a> From<&'a NewUser> for NewUserRow<'a> {
    fn from(user: &'a NewUser) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username.as_str(),
            email: user.email.as_str(),
            password_hash: &user.password_hash,
            avatar: user.avatar.as_deref(),
            role: user.role.as_str(),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::new(&row.username)
            .map_err(|err| format!("invalid username in database: {err}"))?;
        let email = EmailAddress::parse(&row.email)
            .map_err(|err| format!("invalid email in database: {err}"))?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|err| format!("invalid role in database: {err}"))?;
        Ok(Self {
            id: UserId::from_uuid(row.id),
            username,
            email,
            password_hash: row.password_hash,
            avatar: row.avatar,
            confirmed: row.confirmed,
            refresh_token: row.refresh_token,
            role,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Contact models
// ---------------------------------------------------------------------------

/// Row struct for reading from the contacts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contacts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContactRow {
    pub id: i64,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new contact records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = contacts)]
pub(crate) struct NewContactRow<'a> {
    pub user_id: Uuid,
    pub first_name: &'a str,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub birthday: Option<NaiveDate>,
    pub notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewContactRow<'a> {
    pub(crate) fn new(owner: &UserId, draft: &'a ContactDraft, now: DateTime<Utc>) -> Self {
        Self {
            user_id: *owner.as_uuid(),
            first_name: &draft.first_name,
            last_name: draft.last_name.as_deref(),
            email: draft.email.as_ref().map(EmailAddress::as_str),
            phone: draft.phone.as_deref(),
            birthday: draft.birthday,
            notes: draft.notes.as_deref(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Changeset overwriting every mutable contact column.
///
/// `treat_none_as_null` makes cleared optional fields reach the database.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = contacts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ContactUpdate<'a> {
    pub first_name: &'a str,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub birthday: Option<NaiveDate>,
    pub notes: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Contact> for ContactUpdate<'a> {
    fn from(contact: &'a Contact) -> Self {
        Self {
            first_name: &contact.first_name,
            last_name: contact.last_name.as_deref(),
            email: contact.email.as_ref().map(EmailAddress::as_str),
            phone: contact.phone.as_deref(),
            birthday: contact.birthday,
            notes: contact.notes.as_deref(),
            updated_at: contact.updated_at,
        }
    }
}

impl TryFrom<ContactRow> for Contact {
    type Error = String;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let id =
            ContactId::new(row.id).map_err(|err| format!("invalid contact id in database: {err}"))?;
        let email = row
            .email
            .map(EmailAddress::parse)
            .transpose()
            .map_err(|err| format!("invalid contact email in database: {err}"))?;
        Ok(Self {
            id,
            owner: UserId::from_uuid(row.user_id),
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            phone: row.phone,
            birthday: row.birthday,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
