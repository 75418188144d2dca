//! API request and response data models.
//!
//! API models are distinct from database models so the wire format can evolve separately from
//! storage. Every JSON body uses camelCase field names and every model is annotated with
//! `utoipa` for the generated API docs.
//!
//! - [`auth`]: Login, registration, and password change payloads
//! - [`users`]: The authenticated caller and profile payloads (password hashes are never returned)
//! - [`snippets`]: Snippet payloads, input limits and list filters
//! - [`pagination`]: Shared `skip`/`limit` query parameters and the paginated envelope

pub mod auth;
pub mod pagination;
pub mod snippets;
pub mod users;
