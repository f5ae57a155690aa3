//! # Tasknest API Server Library
//!
//! Router, handlers and configuration for the Tasknest HTTP API. The binary
//! in `main.rs` wires these to PostgreSQL; tests wire them to in-memory
//! repositories.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers and OpenAPI document

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
