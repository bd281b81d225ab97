//! Contact records owned by a single user.
//!
//! Contacts are created, patched and deleted by their owner. Every query
//! carries the owner's [`UserId`], so one user can never observe another's
//! records.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EmailAddress, UserId};

/// Maximum length of `first_name` and `last_name`.
pub const NAME_MAX: usize = 50;
/// Maximum length of a contact email.
pub const CONTACT_EMAIL_MAX: usize = 50;
/// Maximum length of a phone number.
pub const PHONE_MAX: usize = 30;
/// Maximum length of the free-text note.
pub const NOTES_MAX: usize = 150;

/// Validation failures for contact payloads and query parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactValidationError {
    /// A required field was missing or blank.
    #[error("{field} must not be empty")]
    Required { field: &'static str },
    /// A text field exceeds its column length.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    /// The email is not a valid address.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// The birthday is today or in the future.
    #[error("birthday must be in the past")]
    BirthdayNotInPast,
    /// Contact identifiers start at one.
    #[error("contact id must be a positive integer")]
    InvalidId,
    /// A numeric parameter is outside its accepted range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
    },
    /// The search term length is outside its accepted range.
    #[error("q must be between {min} and {max} characters")]
    SearchTermLength { min: usize, max: usize },
}

impl ContactValidationError {
    /// Name of the offending field or parameter.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::TooLong { field, .. }
            | Self::OutOfRange { field, .. } => *field,
            Self::InvalidEmail => "email",
            Self::BirthdayNotInPast => "birthday",
            Self::InvalidId => "contact_id",
            Self::SearchTermLength { .. } => "q",
        }
    }
}

/// Positive contact identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = i64, example = 42)]
pub struct ContactId(i64);

impl ContactId {
    /// Validate a raw identifier.
    pub fn new(raw: i64) -> Result<Self, ContactValidationError> {
        if raw < 1 {
            return Err(ContactValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    /// Raw integer value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw contact fields as supplied by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub notes: Option<String>,
}

fn bounded_text(
    value: Option<String>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, ContactValidationError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max {
        return Err(ContactValidationError::TooLong { field, max });
    }
    Ok(Some(trimmed.to_owned()))
}

fn required_text(
    value: Option<String>,
    field: &'static str,
    max: usize,
) -> Result<String, ContactValidationError> {
    bounded_text(value, field, max)?.ok_or(ContactValidationError::Required { field })
}

fn contact_email(value: Option<String>) -> Result<Option<EmailAddress>, ContactValidationError> {
    let Some(raw) = bounded_text(value, "email", CONTACT_EMAIL_MAX)? else {
        return Ok(None);
    };
    EmailAddress::parse(raw)
        .map(Some)
        .map_err(|_| ContactValidationError::InvalidEmail)
}

fn past_birthday(
    value: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<Option<NaiveDate>, ContactValidationError> {
    match value {
        Some(date) if date >= today => Err(ContactValidationError::BirthdayNotInPast),
        other => Ok(other),
    }
}

/// Validated payload for a new contact.
///
/// Blank optional text is stored as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<EmailAddress>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl ContactDraft {
    /// Validate raw fields. `today` bounds the birthday.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use contacts_backend::domain::{ContactDraft, ContactFields};
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    /// let draft = ContactDraft::try_new(
    ///     ContactFields {
    ///         first_name: Some("Jack".into()),
    ///         last_name: Some("".into()),
    ///         ..ContactFields::default()
    ///     },
    ///     today,
    /// )
    /// .unwrap();
    /// assert_eq!(draft.first_name, "Jack");
    /// assert!(draft.last_name.is_none());
    /// ```
    pub fn try_new(fields: ContactFields, today: NaiveDate) -> Result<Self, ContactValidationError> {
        Ok(Self {
            first_name: required_text(fields.first_name, "first_name", NAME_MAX)?,
            last_name: bounded_text(fields.last_name, "last_name", NAME_MAX)?,
            email: contact_email(fields.email)?,
            phone: bounded_text(fields.phone, "phone", PHONE_MAX)?,
            birthday: past_birthday(fields.birthday, today)?,
            notes: bounded_text(fields.notes, "notes", NOTES_MAX)?,
        })
    }
}

/// Validated partial update.
///
/// Outer `None` leaves a column untouched; `Some(None)` clears it. A blank
/// string in the raw payload clears the matching optional column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<Option<String>>,
    pub email: Option<Option<EmailAddress>>,
    pub phone: Option<Option<String>>,
    pub birthday: Option<NaiveDate>,
    pub notes: Option<Option<String>>,
}

impl ContactPatch {
    /// Validate raw fields. Absent fields are left untouched.
    pub fn try_new(fields: ContactFields, today: NaiveDate) -> Result<Self, ContactValidationError> {
        let first_name = match fields.first_name {
            Some(raw) => Some(required_text(Some(raw), "first_name", NAME_MAX)?),
            None => None,
        };
        let last_name = match fields.last_name {
            Some(raw) => Some(bounded_text(Some(raw), "last_name", NAME_MAX)?),
            None => None,
        };
        let email = match fields.email {
            Some(raw) => Some(contact_email(Some(raw))?),
            None => None,
        };
        let phone = match fields.phone {
            Some(raw) => Some(bounded_text(Some(raw), "phone", PHONE_MAX)?),
            None => None,
        };
        let notes = match fields.notes {
            Some(raw) => Some(bounded_text(Some(raw), "notes", NOTES_MAX)?),
            None => None,
        };
        Ok(Self {
            first_name,
            last_name,
            email,
            phone,
            birthday: past_birthday(fields.birthday, today)?,
            notes,
        })
    }

    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Email the patch would set, if any.
    pub fn new_email(&self) -> Option<&EmailAddress> {
        self.email.as_ref().and_then(Option::as_ref)
    }

    /// Phone the patch would set, if any.
    pub fn new_phone(&self) -> Option<&str> {
        self.phone.as_ref().and_then(Option::as_deref)
    }
}

/// Persisted contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Contact {
    pub id: ContactId,
    #[serde(skip)]
    pub owner: UserId,
    #[schema(example = "Jack")]
    pub first_name: String,
    #[schema(example = "Smith")]
    pub last_name: Option<String>,
    #[schema(value_type = Option<String>, example = "jack@example.com")]
    pub email: Option<EmailAddress>,
    #[schema(example = "1234567890")]
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Build a new record from a draft.
    pub fn from_draft(
        id: ContactId,
        owner: UserId,
        draft: ContactDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone: draft.phone,
            birthday: draft.birthday,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch in place, bumping `updated_at`.
    pub fn apply(&mut self, patch: &ContactPatch, now: DateTime<Utc>) {
        if let Some(first_name) = &patch.first_name {
            self.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name.clone_from(last_name);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(phone) = &patch.phone {
            self.phone.clone_from(phone);
        }
        if let Some(birthday) = patch.birthday {
            self.birthday = Some(birthday);
        }
        if let Some(notes) = &patch.notes {
            self.notes.clone_from(notes);
        }
        self.updated_at = now;
    }

    /// Case-insensitive substring match over first name, last name and email.
    pub fn matches(&self, term: &SearchTerm) -> bool {
        let needle = term.as_str().to_lowercase();
        let contains = |value: &str| value.to_lowercase().contains(&needle);
        contains(&self.first_name)
            || self.last_name.as_deref().is_some_and(contains)
            || self.email.as_ref().is_some_and(|email| contains(email.as_str()))
    }

    /// True when the birthday's month and day fall inside `window`.
    pub fn has_birthday_in(&self, window: &[MonthDay]) -> bool {
        self.birthday
            .is_some_and(|date| window.contains(&MonthDay::of(date)))
    }
}

/// Default page size.
pub const PAGE_LIMIT_DEFAULT: u32 = 10;
/// Smallest accepted page size.
pub const PAGE_LIMIT_MIN: u32 = 10;
/// Largest accepted page size.
pub const PAGE_LIMIT_MAX: u32 = 100;

/// Validated limit/offset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: u32,
    offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: PAGE_LIMIT_DEFAULT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Validate optional query parameters, applying defaults.
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Result<Self, ContactValidationError> {
        let limit = limit.unwrap_or(PAGE_LIMIT_DEFAULT);
        if !(PAGE_LIMIT_MIN..=PAGE_LIMIT_MAX).contains(&limit) {
            return Err(ContactValidationError::OutOfRange {
                field: "limit",
                min: PAGE_LIMIT_MIN,
                max: PAGE_LIMIT_MAX,
            });
        }
        Ok(Self {
            limit,
            offset: offset.unwrap_or(0),
        })
    }

    /// Maximum number of rows returned.
    pub fn limit(self) -> u32 {
        self.limit
    }

    /// Number of rows skipped.
    pub fn offset(self) -> u32 {
        self.offset
    }
}

/// Shortest accepted search term.
pub const SEARCH_TERM_MIN: usize = 3;
/// Longest accepted search term.
pub const SEARCH_TERM_MAX: usize = 50;

/// Trimmed search term of 3 to 50 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Validate a raw query string.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if !(SEARCH_TERM_MIN..=SEARCH_TERM_MAX).contains(&length) {
            return Err(ContactValidationError::SearchTermLength {
                min: SEARCH_TERM_MIN,
                max: SEARCH_TERM_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the term.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// SQL `ILIKE` pattern with wildcards escaped.
    pub fn like_pattern(&self) -> String {
        let escaped = self
            .0
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    }
}

/// Calendar month and day, ignoring the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Month and day of `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    /// `MM-DD` form, matching PostgreSQL's `to_char(date, 'MM-DD')`.
    pub fn key(self) -> String {
        format!("{:02}-{:02}", self.month, self.day)
    }
}

/// Number of days after today covered by the birthday window.
pub const BIRTHDAY_WINDOW_DAYS: usize = 7;

/// Month/day pairs of the seven days after `today`.
///
/// Today itself is excluded. In a non-leap year a window containing 1 March
/// also contains 29 February, so leap-day birthdays are not skipped.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use contacts_backend::domain::birthday_window;
///
/// let window = birthday_window(NaiveDate::from_ymd_opt(2023, 12, 28).unwrap());
/// let keys: Vec<String> = window.iter().map(|day| day.key()).collect();
/// assert_eq!(keys, ["12-29", "12-30", "12-31", "01-01", "01-02", "01-03", "01-04"]);
/// ```
pub fn birthday_window(today: NaiveDate) -> Vec<MonthDay> {
    let mut window = Vec::new();
    for date in today.iter_days().skip(1).take(BIRTHDAY_WINDOW_DAYS) {
        if is_leap_year(date.year()) || !is_first_of_march(date) {
            window.push(MonthDay::of(date));
            continue;
        }
        window.push(MonthDay { month: 2, day: 29 });
        window.push(MonthDay::of(date));
    }
    window
}

fn is_first_of_march(date: NaiveDate) -> bool {
    date.month() == 3 && date.day() == 1
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

#[cfg(test)]
#[path = "contact_tests.rs"]
mod tests;
