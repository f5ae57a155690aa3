/// Domain models for Tasknest
///
/// Plain records shared by every layer. Storage row types live with the
/// repository implementations and map into these.
///
/// # Models
///
/// - `user`: User accounts
/// - `task`: Tasks, patches, listing filters and title validation
/// - `page`: Pagination window and paged results

pub mod page;
pub mod task;
pub mod user;
