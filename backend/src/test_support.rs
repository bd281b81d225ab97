//! Test utilities for the backend crate.
//!
//! In-memory implementations of the driven ports, shared by unit tests (in
//! `src/`) and integration tests (in `tests/`). Compiled for tests and when
//! the `test-support` feature is enabled.

mod cache;
mod clock;
mod contacts;
mod doubles;
mod users;

pub use cache::{InMemoryRateLimiter, InMemoryUserCache};
pub use clock::MutableClock;
pub use contacts::InMemoryContactRepository;
pub use doubles::{InsecureTestHasher, RecordingMailer, SentConfirmation, StubAvatarStore};
pub use users::InMemoryUserRepository;
