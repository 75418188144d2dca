//! Database record types.
//!
//! Each entity has a create request, an update request and a response type. Responses derive
//! `sqlx::FromRow` and map one-to-one onto table columns; they are converted into API models at
//! the handler boundary, which is where secrets such as password hashes are dropped.

pub mod snippets;
pub mod users;
