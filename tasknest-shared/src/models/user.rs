/// User model
///
/// Users authenticate with email and password and own tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id            BIGSERIAL PRIMARY KEY,
///     email         VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     created_by    BIGINT,
///     updated_by    BIGINT,
///     created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE UNIQUE INDEX users_email_key ON users (LOWER(email));
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account
///
/// Passwords are stored as Argon2id hashes, never in plaintext, and the
/// hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique (case-insensitive) email address
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_by: Option<i64>,

    pub updated_by: Option<i64>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address, already normalized to lowercase
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}
