//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **cache**: Redis user cache and rate limiter
//! - **security**: Argon2 password hashing and JWT signing
//! - **mail**: SMTP confirmation emails
//! - **media**: Cloudinary avatar uploads
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
pub mod mail;
pub mod media;
pub mod persistence;
pub mod security;
