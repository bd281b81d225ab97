//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Uniqueness rules and validation live in the domain.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leak into the domain layer.
//! - **Strongly typed errors**: every pool and Diesel error maps to the
//!   port's error enum.
//!
//! # Example
//!
//! ```no_run
//! use contacts_backend::outbound::persistence::{
//!     DbPool, DieselContactRepository, DieselUserRepository, PoolConfig,
//! };
//!
//! # async fn wire() -> Result<(), contacts_backend::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/contacts")).await?;
//! let users = DieselUserRepository::new(pool.clone());
//! let contacts = DieselContactRepository::new(pool);
//! # Ok(())
//! # }
//! ```

mod diesel_contact_repository;
mod diesel_database_probe;
mod diesel_error_mapping;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_contact_repository::DieselContactRepository;
pub use diesel_database_probe::DieselDatabaseProbe;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
