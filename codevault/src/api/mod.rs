//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//! - **[`extract`]**: `Json`, `Path` and `Query` extractors that reject with a JSON error body
//!
//! # API Structure
//!
//! - **Authentication** (`/api/auth/*`): Registration, login, password change
//! - **Users** (`/api/users/me`): The caller's own profile
//! - **Snippets** (`/api/snippets/*`): Snippet storage, public browsing, usage counters
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa` annotations. The docs UI is served at `/docs` and
//! the raw document at `/api-docs/openapi.json`.

pub mod extract;
pub mod handlers;
pub mod models;
