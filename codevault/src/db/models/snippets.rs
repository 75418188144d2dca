//! Database models for snippets.

use crate::api::models::snippets::{SnippetCreate, SnippetUpdate};
use crate::tags::normalize_tags;
use crate::types::{SnippetId, UserId};
use chrono::{DateTime, Utc};

/// Trim an optional text field, storing blank values as NULL.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Database request for creating a new snippet
#[derive(Debug, Clone)]
pub struct SnippetCreateDBRequest {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub code: String,
    pub language: String,
    pub framework: Option<String>,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub is_favorite: bool,
    pub folder_path: Option<String>,
    pub source_url: Option<String>,
}

impl SnippetCreateDBRequest {
    pub fn new(user_id: UserId, create: SnippetCreate) -> Self {
        Self {
            user_id,
            title: create.title.trim().to_string(),
            description: create.description.unwrap_or_default(),
            code: create.code,
            language: create.language.trim().to_string(),
            framework: non_blank(create.framework),
            tags: normalize_tags(create.tags),
            is_public: create.is_public,
            is_favorite: create.is_favorite,
            folder_path: non_blank(create.folder_path),
            source_url: non_blank(create.source_url),
        }
    }
}

/// Database request for updating a snippet.
///
/// `None` leaves a column untouched. For the nullable columns, `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct SnippetUpdateDBRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    pub framework: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub is_favorite: Option<bool>,
    pub folder_path: Option<Option<String>>,
    pub source_url: Option<Option<String>>,
}

impl From<SnippetUpdate> for SnippetUpdateDBRequest {
    fn from(update: SnippetUpdate) -> Self {
        Self {
            title: update.title.map(|t| t.trim().to_string()),
            description: update.description,
            code: update.code,
            language: update.language.map(|l| l.trim().to_string()),
            // A blank value clears the column, like an explicit null
            framework: update.framework.map(non_blank),
            tags: update.tags.map(normalize_tags),
            is_public: update.is_public,
            is_favorite: update.is_favorite,
            folder_path: update.folder_path.map(non_blank),
            source_url: update.source_url.map(non_blank),
        }
    }
}

/// Database response for a snippet
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnippetDBResponse {
    pub id: SnippetId,
    pub title: String,
    pub description: String,
    pub code: String,
    pub language: String,
    pub framework: Option<String>,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub is_favorite: bool,
    pub view_count: i32,
    pub copy_count: i32,
    pub last_accessed_at: DateTime<Utc>,
    pub version: i32,
    pub previous_version_id: Option<SnippetId>,
    pub folder_path: Option<String>,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_optional_fields_stored_as_null() {
        let create: SnippetCreate = serde_json::from_value(serde_json::json!({
            "title": "x",
            "code": "print(1)",
            "language": "python",
            "framework": "  ",
            "folderPath": "",
            "sourceUrl": " https://example.com/a "
        }))
        .unwrap();

        let request = SnippetCreateDBRequest::new(1, create);
        assert_eq!(request.framework, None);
        assert_eq!(request.folder_path, None);
        assert_eq!(request.source_url.as_deref(), Some("https://example.com/a"));
    }

    #[test]
    fn test_blank_update_clears_column() {
        let update: SnippetUpdate = serde_json::from_value(serde_json::json!({
            "framework": "",
            "folderPath": " notes/rust "
        }))
        .unwrap();

        let request = SnippetUpdateDBRequest::from(update);
        assert_eq!(request.framework, Some(None));
        assert_eq!(request.folder_path, Some(Some("notes/rust".to_string())));
        assert_eq!(request.source_url, None);
    }
}
