/// Database layer for Tasknest
///
/// - `pool`: PostgreSQL connection pool construction and health checks
/// - `migrations`: embedded schema migrations (from `migrations/` at the workspace root)
///
/// Repositories built on top of the pool live in [`crate::repository`].

pub mod migrations;
pub mod pool;
