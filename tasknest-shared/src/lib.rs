//! # Tasknest Shared Library
//!
//! Domain types, persistence and authentication used by the Tasknest API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Users, tasks and pagination
//! - `repository`: Storage traits with Postgres and in-memory implementations
//! - `usecase`: Task and account operations on top of the repositories
//! - `auth`: Password hashing, JWT tokens and the bearer-token middleware
//! - `db`: Connection pool and migrations
//! - `cache`: Optional Redis connection

pub mod auth;
pub mod cache;
pub mod db;
pub mod models;
pub mod repository;
pub mod usecase;

/// Current version of the Tasknest shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
