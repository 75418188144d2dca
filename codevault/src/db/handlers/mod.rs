//! Repository implementations for database access.
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed operations over one table
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Users`]: User accounts and credentials
//! - [`Snippets`]: Snippets, their filters and usage counters
//!
//! # Common Pattern
//!
//! ```ignore
//! use codevault::db::handlers::{Repository, Snippets};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Snippets::new(&mut tx);
//!
//!     let snippet = repo.get_by_id(1).await?;
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod repository;
pub mod snippets;
pub mod users;

pub use repository::Repository;
pub use snippets::{SnippetFilter, Snippets};
pub use users::Users;
