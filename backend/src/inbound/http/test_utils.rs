//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;
use chrono::{TimeZone, Utc};

use crate::domain::ports::{
    MockAuthCommand, MockContactsCommand, MockContactsQuery, MockCurrentUserQuery,
    MockDatabaseProbe, MockProfileCommand,
};
use crate::domain::{
    Contact, ContactId, EmailAddress, Role, UserId, UserProfile, Username,
};

use super::state::{HttpState, HttpStatePorts};

/// Bearer token accepted by [`authenticated`] mocks.
pub const ACCESS_TOKEN: &str = "access-token";

/// Mock ports with no expectations; tests set the ones they exercise.
#[derive(Default)]
pub struct MockPorts {
    pub auth: MockAuthCommand,
    pub current_user: MockCurrentUserQuery,
    pub profile: MockProfileCommand,
    pub contacts: MockContactsCommand,
    pub contacts_query: MockContactsQuery,
    pub database: MockDatabaseProbe,
}

impl MockPorts {
    /// Wrap the mocks as shared handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            auth: Arc::new(self.auth),
            current_user: Arc::new(self.current_user),
            profile: Arc::new(self.profile),
            contacts: Arc::new(self.contacts),
            contacts_query: Arc::new(self.contacts_query),
            database: Arc::new(self.database),
        }))
    }
}

/// Profile used as the authenticated caller in handler tests.
pub fn sample_profile() -> UserProfile {
    UserProfile {
        id: UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id"),
        username: Username::new("ada").expect("fixture username"),
        email: EmailAddress::parse("ada@example.com").expect("fixture email"),
        avatar: Some("https://www.gravatar.com/avatar/abc?d=identicon".to_owned()),
        role: Role::User,
        confirmed: true,
        created_at: Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("fixture timestamp"),
    }
}

/// Contact owned by [`sample_profile`].
pub fn sample_contact(id: i64) -> Contact {
    let now = Utc
        .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .expect("fixture timestamp");
    Contact {
        id: ContactId::new(id).expect("fixture contact id"),
        owner: sample_profile().id,
        first_name: "Jack".to_owned(),
        last_name: Some("Smith".to_owned()),
        email: Some(EmailAddress::parse("jack@example.com").expect("fixture email")),
        phone: Some("1234567890".to_owned()),
        birthday: None,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

/// Configure `current_user` to accept [`ACCESS_TOKEN`] as `profile`.
pub fn authenticated(ports: &mut MockPorts, profile: UserProfile) {
    ports
        .current_user
        .expect_current_user()
        .withf(|token| token == ACCESS_TOKEN)
        .returning(move |_| Ok(profile.clone()));
}

/// `Authorization` header value for [`ACCESS_TOKEN`].
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {ACCESS_TOKEN}"))
}
