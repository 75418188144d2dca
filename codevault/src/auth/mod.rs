//! Authentication and authorization.
//!
//! Users register and log in with a username and password. Both return a signed session token
//! (HS256 JWT) that clients send back as `Authorization: Bearer <token>`. The token carries the
//! user id and username, so authenticating a request does not touch the database.
//!
//! # Modules
//!
//! - [`current_user`]: Extractors for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2id
//! - [`permissions`]: Snippet ownership and visibility rules
//! - [`session`]: Session token issuing and verification
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use codevault::api::models::users::CurrentUser;
//!
//! // Bearer token required
//! async fn protected_handler(current_user: CurrentUser) -> String {
//!     format!("Hello, {}!", current_user.username)
//! }
//!
//! // Anonymous callers allowed, invalid tokens still rejected
//! async fn public_handler(current_user: Option<CurrentUser>) -> String {
//!     current_user.map(|u| u.username).unwrap_or_default()
//! }
//! ```

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
