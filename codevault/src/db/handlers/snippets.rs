//! Database repository for snippets.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::snippets::{SnippetCreateDBRequest, SnippetDBResponse, SnippetUpdateDBRequest},
};
use crate::types::{SnippetId, UserId};
use sqlx::{PgConnection, Postgres, query_builder::QueryBuilder};
use tracing::instrument;

/// Filter options for listing snippets
#[derive(Debug, Clone, Default)]
pub struct SnippetFilter {
    pub skip: i64,
    pub limit: i64,
    pub owner: Option<UserId>,   // None = any owner
    pub public_only: bool,       // true = only snippets with is_public set
    pub language: Option<String>,
    pub framework: Option<String>,
    pub tags: Vec<String>,       // Every listed tag must be present
    pub is_favorite: Option<bool>,
    pub folder_prefix: Option<String>,
    pub search: Option<String>,  // Case-insensitive substring match on title and description
}

impl SnippetFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            ..Default::default()
        }
    }

    pub fn owned_by(mut self, user_id: UserId) -> Self {
        self.owner = Some(user_id);
        self
    }

    pub fn public(mut self) -> Self {
        self.public_only = true;
        self
    }

    /// Append the WHERE conditions shared by `list` and `count`.
    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(owner) = self.owner {
            query.push(" AND user_id = ");
            query.push_bind(owner);
        }

        if self.public_only {
            query.push(" AND is_public");
        }

        if let Some(ref language) = self.language {
            query.push(" AND language = ");
            query.push_bind(language.clone());
        }

        if let Some(ref framework) = self.framework {
            query.push(" AND framework = ");
            query.push_bind(framework.clone());
        }

        if !self.tags.is_empty() {
            query.push(" AND tags @> ");
            query.push_bind(self.tags.clone());
        }

        if let Some(is_favorite) = self.is_favorite {
            query.push(" AND is_favorite = ");
            query.push_bind(is_favorite);
        }

        if let Some(ref prefix) = self.folder_prefix {
            query.push(" AND starts_with(folder_path, ");
            query.push_bind(prefix.clone());
            query.push(")");
        }

        if let Some(ref search) = self.search {
            // strpos rather than LIKE so % and _ in the search text match literally
            let needle = search.to_lowercase();
            query.push(" AND (strpos(LOWER(title), ");
            query.push_bind(needle.clone());
            query.push(") > 0 OR strpos(LOWER(description), ");
            query.push_bind(needle);
            query.push(") > 0)");
        }
    }
}

pub struct Snippets<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Snippets<'c> {
    type CreateRequest = SnippetCreateDBRequest;
    type UpdateRequest = SnippetUpdateDBRequest;
    type Response = SnippetDBResponse;
    type Id = SnippetId;

    #[instrument(skip(self, request), fields(user_id = request.user_id, language = %request.language), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let snippet = sqlx::query_as::<_, SnippetDBResponse>(
            r#"
            INSERT INTO snippets (
                user_id, title, description, code, language, framework, tags,
                is_public, is_favorite, folder_path, source_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.code)
        .bind(&request.language)
        .bind(&request.framework)
        .bind(&request.tags)
        .bind(request.is_public)
        .bind(request.is_favorite)
        .bind(&request.folder_path)
        .bind(&request.source_url)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(snippet)
    }

    #[instrument(skip(self), fields(snippet_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let snippet = sqlx::query_as::<_, SnippetDBResponse>("SELECT * FROM snippets WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(snippet)
    }

    /// Apply the supplied fields. `version` is left alone and `updated_at` takes the wall clock
    /// at execution time, so two updates in one transaction still get distinct timestamps.
    #[instrument(skip(self, request), fields(snippet_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE snippets SET updated_at = clock_timestamp()");

        if let Some(ref title) = request.title {
            query.push(", title = ");
            query.push_bind(title.clone());
        }
        if let Some(ref description) = request.description {
            query.push(", description = ");
            query.push_bind(description.clone());
        }
        if let Some(ref code) = request.code {
            query.push(", code = ");
            query.push_bind(code.clone());
        }
        if let Some(ref language) = request.language {
            query.push(", language = ");
            query.push_bind(language.clone());
        }
        if let Some(ref framework) = request.framework {
            query.push(", framework = ");
            query.push_bind(framework.clone());
        }
        if let Some(ref tags) = request.tags {
            query.push(", tags = ");
            query.push_bind(tags.clone());
        }
        if let Some(is_public) = request.is_public {
            query.push(", is_public = ");
            query.push_bind(is_public);
        }
        if let Some(is_favorite) = request.is_favorite {
            query.push(", is_favorite = ");
            query.push_bind(is_favorite);
        }
        if let Some(ref folder_path) = request.folder_path {
            query.push(", folder_path = ");
            query.push_bind(folder_path.clone());
        }
        if let Some(ref source_url) = request.source_url {
            query.push(", source_url = ");
            query.push_bind(source_url.clone());
        }

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" RETURNING *");

        // RowNotFound from fetch_one maps to DbError::NotFound
        let snippet = query.build_query_as::<SnippetDBResponse>().fetch_one(&mut *self.db).await?;

        Ok(snippet)
    }
}

impl<'c> Snippets<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// List snippets matching the filter, most recently updated first.
    #[instrument(skip(self, filter), fields(owner = ?filter.owner, public_only = filter.public_only), err)]
    pub async fn list(&mut self, filter: &SnippetFilter) -> Result<Vec<SnippetDBResponse>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM snippets WHERE 1=1");
        filter.push_conditions(&mut query);

        // id breaks ties so paging is stable
        query.push(" ORDER BY updated_at DESC, id DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let snippets = query.build_query_as::<SnippetDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(snippets)
    }

    /// Count snippets matching the filter (without pagination)
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &SnippetFilter) -> Result<i64> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM snippets WHERE 1=1");
        filter.push_conditions(&mut query);

        let count = query.build_query_scalar::<i64>().fetch_one(&mut *self.db).await?;

        Ok(count)
    }

    /// Count a read and stamp the access time. The counter saturates at `i32::MAX`.
    #[instrument(skip(self), fields(snippet_id = id), err)]
    pub async fn record_view(&mut self, id: SnippetId) -> Result<SnippetDBResponse> {
        let snippet = sqlx::query_as::<_, SnippetDBResponse>(
            "UPDATE snippets SET view_count = LEAST(view_count, 2147483646) + 1, last_accessed_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(snippet)
    }

    /// Count a copy and stamp the access time. The counter saturates at `i32::MAX`.
    #[instrument(skip(self), fields(snippet_id = id), err)]
    pub async fn record_copy(&mut self, id: SnippetId) -> Result<SnippetDBResponse> {
        let snippet = sqlx::query_as::<_, SnippetDBResponse>(
            "UPDATE snippets SET copy_count = LEAST(copy_count, 2147483646) + 1, last_accessed_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(snippet)
    }
}
