//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Registered accounts.
    ///
    /// The `id` column is the primary key (UUID v4). `email` carries a unique
    /// index and is stored lower-cased.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        /// Gravatar or image-host URL.
        avatar -> Nullable<Varchar>,
        confirmed -> Bool,
        /// Most recently issued refresh token; cleared on reuse.
        refresh_token -> Nullable<Varchar>,
        /// One of `admin`, `moderator`, `user`, `guest`.
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Address-book entries, each owned by one user.
    contacts (id) {
        id -> Int8,
        user_id -> Uuid,
        first_name -> Varchar,
        last_name -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        birthday -> Nullable<Date>,
        notes -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(contacts -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(contacts, users);
