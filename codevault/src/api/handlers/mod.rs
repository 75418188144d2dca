//! HTTP request handlers for all API endpoints.
//!
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication and ownership checks
//! - Calling the database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`auth`]: Registration, login, and password change
//! - [`users`]: The caller's own profile
//! - [`snippets`]: Snippet create, read, update, listing and usage counters
//!
//! # Authentication
//!
//! Handlers that take a [`crate::api::models::users::CurrentUser`] require a bearer token.
//! Handlers that take `Option<CurrentUser>` also serve anonymous callers.

pub mod auth;
pub mod snippets;
pub mod users;
