//! API request/response models for snippets.

use super::pagination::{Page, Pagination};
use crate::config::SnippetLimitsConfig;
use crate::db::handlers::SnippetFilter;
use crate::db::models::snippets::SnippetDBResponse;
use crate::errors::Error;
use crate::tags::{normalize_tags, split_tags};
use crate::types::{SnippetId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use url::Url;
use utoipa::{IntoParams, ToSchema};

/// Create snippet request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnippetCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Private unless set
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub folder_path: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Partial snippet update.
///
/// Absent fields keep their current value. `framework`, `folderPath` and `sourceUrl` can be
/// cleared with an explicit `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnippetUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    #[serde(default, with = "serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub framework: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub is_favorite: Option<bool>,
    #[serde(default, with = "serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub folder_path: Option<Option<String>>,
    #[serde(default, with = "serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub source_url: Option<Option<String>>,
}

fn bad_request(message: impl Into<String>) -> Error {
    Error::BadRequest { message: message.into() }
}

fn validate_title(title: &str, limits: &SnippetLimitsConfig) -> Result<(), Error> {
    let title = title.trim();
    if title.is_empty() {
        return Err(bad_request("Title is required"));
    }
    if title.chars().count() > limits.max_title_length {
        return Err(bad_request(format!(
            "Title must be at most {} characters",
            limits.max_title_length
        )));
    }
    Ok(())
}

fn validate_code(code: &str, limits: &SnippetLimitsConfig) -> Result<(), Error> {
    if code.trim().is_empty() {
        return Err(bad_request("Code is required"));
    }
    if code.chars().count() > limits.max_code_length {
        return Err(bad_request(format!(
            "Code must be at most {} characters",
            limits.max_code_length
        )));
    }
    Ok(())
}

fn validate_language(language: &str) -> Result<(), Error> {
    if language.trim().is_empty() {
        return Err(bad_request("Language is required"));
    }
    Ok(())
}

fn validate_tags(tags: &[String], limits: &SnippetLimitsConfig) -> Result<(), Error> {
    let tags = normalize_tags(tags);
    if tags.len() > limits.max_tags {
        return Err(bad_request(format!("At most {} tags are allowed", limits.max_tags)));
    }
    if tags.iter().any(|t| t.chars().count() > limits.max_tag_length) {
        return Err(bad_request(format!(
            "Tags must be at most {} characters",
            limits.max_tag_length
        )));
    }
    Ok(())
}

fn validate_source_url(source_url: Option<&str>) -> Result<(), Error> {
    match source_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(raw) => Url::parse(raw)
            .map(|_| ())
            .map_err(|e| bad_request(format!("Source URL is not a valid URL: {e}"))),
        None => Ok(()),
    }
}

impl SnippetCreate {
    pub fn validate(&self, limits: &SnippetLimitsConfig) -> Result<(), Error> {
        validate_title(&self.title, limits)?;
        validate_code(&self.code, limits)?;
        validate_language(&self.language)?;
        validate_source_url(self.source_url.as_deref())?;
        validate_tags(&self.tags, limits)
    }
}

impl SnippetUpdate {
    pub fn validate(&self, limits: &SnippetLimitsConfig) -> Result<(), Error> {
        if let Some(title) = &self.title {
            validate_title(title, limits)?;
        }
        if let Some(code) = &self.code {
            validate_code(code, limits)?;
        }
        if let Some(language) = &self.language {
            validate_language(language)?;
        }
        if let Some(tags) = &self.tags {
            validate_tags(tags, limits)?;
        }
        if let Some(source_url) = &self.source_url {
            validate_source_url(source_url.as_deref())?;
        }
        Ok(())
    }
}

/// Snippet response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnippetResponse {
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
    /// Reserved for version chains, never set by the API
    pub previous_version_id: Option<SnippetId>,
    pub folder_path: Option<String>,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: UserId,
}

impl From<SnippetDBResponse> for SnippetResponse {
    fn from(db: SnippetDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            description: db.description,
            code: db.code,
            language: db.language,
            framework: db.framework,
            tags: db.tags,
            is_public: db.is_public,
            is_favorite: db.is_favorite,
            view_count: db.view_count,
            copy_count: db.copy_count,
            last_accessed_at: db.last_accessed_at,
            version: db.version,
            previous_version_id: db.previous_version_id,
            folder_path: db.folder_path,
            source_url: db.source_url,
            created_at: db.created_at,
            updated_at: db.updated_at,
            user_id: db.user_id,
        }
    }
}

/// Query parameters for listing snippets
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListSnippetsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Exact language match
    pub language: Option<String>,

    /// Exact framework match
    pub framework: Option<String>,

    /// Comma-separated tags; every tag must be present on the snippet
    pub tags: Option<String>,

    /// Only favorites (true) or only non-favorites (false)
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub favorite: Option<bool>,

    /// Folder path prefix
    pub folder: Option<String>,

    /// Case-insensitive substring search over title and description
    pub search: Option<String>,
}

impl ListSnippetsQuery {
    /// Build the repository filter. Blank values are treated as absent.
    pub fn to_filter(&self) -> SnippetFilter {
        let non_blank = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        let page = Page::from(&self.pagination);

        SnippetFilter {
            language: non_blank(&self.language),
            framework: non_blank(&self.framework),
            tags: self.tags.as_deref().map(split_tags).unwrap_or_default(),
            is_favorite: self.favorite,
            folder_prefix: non_blank(&self.folder),
            search: non_blank(&self.search),
            ..SnippetFilter::new(page.skip, page.limit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(title: &str, code: &str, language: &str) -> SnippetCreate {
        SnippetCreate {
            title: title.to_string(),
            description: None,
            code: code.to_string(),
            language: language.to_string(),
            framework: None,
            tags: vec![],
            is_public: false,
            is_favorite: false,
            folder_path: None,
            source_url: None,
        }
    }

    #[test]
    fn test_create_defaults_from_minimal_json() {
        let parsed: SnippetCreate =
            serde_json::from_str(r#"{"title":"x","code":"print(1)","language":"python"}"#).unwrap();
        assert!(!parsed.is_public);
        assert!(!parsed.is_favorite);
        assert!(parsed.tags.is_empty());
        assert!(parsed.validate(&SnippetLimitsConfig::default()).is_ok());
    }

    #[test]
    fn test_create_validation() {
        let limits = SnippetLimitsConfig {
            max_title_length: 5,
            max_code_length: 10,
            max_tags: 2,
            max_tag_length: 4,
        };

        assert!(create("x", "print(1)", "python").validate(&limits).is_ok());
        assert!(create("   ", "print(1)", "python").validate(&limits).is_err());
        assert!(create("toolong", "print(1)", "python").validate(&limits).is_err());
        assert!(create("x", "", "python").validate(&limits).is_err());
        assert!(create("x", "print(1234567)", "python").validate(&limits).is_err());
        assert!(create("x", "print(1)", " ").validate(&limits).is_err());

        let mut many_tags = create("x", "print(1)", "python");
        many_tags.tags = vec!["a".into(), "b".into(), "c".into()];
        assert!(many_tags.validate(&limits).is_err());

        // Blank tags are dropped before counting
        many_tags.tags = vec!["a".into(), " ".into(), "b".into()];
        assert!(many_tags.validate(&limits).is_ok());

        let mut long_tag = create("x", "print(1)", "python");
        long_tag.tags = vec!["toolong".into()];
        assert!(long_tag.validate(&limits).is_err());
    }

    #[test]
    fn test_code_length_counts_characters() {
        let limits = SnippetLimitsConfig {
            max_code_length: 3,
            ..Default::default()
        };
        // Three characters, nine bytes
        assert!(create("x", "日本語", "text").validate(&limits).is_ok());
    }

    #[test]
    fn test_update_validates_only_supplied_fields() {
        let limits = SnippetLimitsConfig::default();
        assert!(SnippetUpdate::default().validate(&limits).is_ok());

        let blank_title = SnippetUpdate {
            title: Some("".to_string()),
            ..Default::default()
        };
        assert!(matches!(blank_title.validate(&limits), Err(Error::BadRequest { .. })));
    }

    #[test]
    fn test_source_url_must_parse() {
        let limits = SnippetLimitsConfig::default();

        let mut snippet = create("x", "print(1)", "python");
        snippet.source_url = Some("https://github.com/rust-lang/rust".to_string());
        assert!(snippet.validate(&limits).is_ok());

        snippet.source_url = Some("   ".to_string());
        assert!(snippet.validate(&limits).is_ok());

        snippet.source_url = Some("not a url".to_string());
        assert!(matches!(snippet.validate(&limits), Err(Error::BadRequest { .. })));

        let update = SnippetUpdate {
            source_url: Some(Some("::nope".to_string())),
            ..Default::default()
        };
        assert!(matches!(update.validate(&limits), Err(Error::BadRequest { .. })));

        let clear = SnippetUpdate {
            source_url: Some(None),
            ..Default::default()
        };
        assert!(clear.validate(&limits).is_ok());
    }

    #[test]
    fn test_update_null_clears_nullable_fields() {
        let parsed: SnippetUpdate = serde_json::from_str(r#"{"title":"y","framework":null}"#).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("y"));
        assert_eq!(parsed.framework, Some(None));
        assert_eq!(parsed.folder_path, None);
    }

    #[test]
    fn test_response_is_camel_case() {
        let now = Utc::now();
        let response = SnippetResponse::from(SnippetDBResponse {
            id: 3,
            title: "x".to_string(),
            description: String::new(),
            code: "print(1)".to_string(),
            language: "python".to_string(),
            framework: None,
            tags: vec!["api".to_string()],
            is_public: false,
            is_favorite: true,
            view_count: 0,
            copy_count: 0,
            last_accessed_at: now,
            version: 1,
            previous_version_id: None,
            folder_path: None,
            source_url: None,
            created_at: now,
            updated_at: now,
            user_id: 9,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["userId"], 9);
        assert_eq!(json["isFavorite"], true);
        assert_eq!(json["version"], 1);
        assert!(json["previousVersionId"].is_null());
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_query_to_filter() {
        let query = ListSnippetsQuery {
            pagination: Pagination {
                skip: Some(5),
                limit: Some(500),
            },
            language: Some("rust".to_string()),
            framework: Some("  ".to_string()),
            tags: Some("api,,auth".to_string()),
            favorite: Some(true),
            folder: None,
            search: Some(" router ".to_string()),
        };

        let filter = query.to_filter();
        assert_eq!(filter.skip, 5);
        assert_eq!(filter.limit, 100);
        assert_eq!(filter.language.as_deref(), Some("rust"));
        assert_eq!(filter.framework, None);
        assert_eq!(filter.tags, vec!["api", "auth"]);
        assert_eq!(filter.is_favorite, Some(true));
        assert_eq!(filter.search.as_deref(), Some("router"));
        assert_eq!(filter.owner, None);
        assert!(!filter.public_only);
    }
}
