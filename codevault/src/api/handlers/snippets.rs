use axum::extract::State;

use crate::{
    AppState,
    api::{
        extract::{Json, Path, Query},
        models::{
            pagination::PaginatedResponse,
            snippets::{ListSnippetsQuery, SnippetCreate, SnippetResponse, SnippetUpdate},
            users::CurrentUser,
        },
    },
    auth::permissions,
    db::{
        handlers::{Repository, SnippetFilter, Snippets},
        models::snippets::{SnippetCreateDBRequest, SnippetDBResponse, SnippetUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{Operation, SnippetId},
};

fn not_found(id: SnippetId) -> Error {
    Error::NotFound {
        resource: "Snippet".to_string(),
        id: id.to_string(),
    }
}

async fn list_page(state: &AppState, filter: SnippetFilter) -> Result<PaginatedResponse<SnippetResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Snippets::new(&mut pool_conn);

    let snippets = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(PaginatedResponse::new(
        snippets.into_iter().map(SnippetResponse::from).collect(),
        total_count,
        filter.skip,
        filter.limit,
    ))
}

/// List the caller's own snippets
#[utoipa::path(
    get,
    path = "/api/snippets",
    tag = "snippets",
    params(ListSnippetsQuery),
    responses(
        (status = 200, description = "Paginated list of the caller's snippets", body = PaginatedResponse<SnippetResponse>),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn list_snippets(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListSnippetsQuery>,
) -> Result<Json<PaginatedResponse<SnippetResponse>>> {
    let filter = query.to_filter().owned_by(current_user.id);
    Ok(Json(list_page(&state, filter).await?))
}

/// List public snippets from every user
#[utoipa::path(
    get,
    path = "/api/snippets/public",
    tag = "snippets",
    params(ListSnippetsQuery),
    responses(
        (status = 200, description = "Paginated list of public snippets", body = PaginatedResponse<SnippetResponse>),
        (status = 401, description = "Authorization header present but invalid", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_public_snippets(
    State(state): State<AppState>,
    _current_user: Option<CurrentUser>,
    Query(query): Query<ListSnippetsQuery>,
) -> Result<Json<PaginatedResponse<SnippetResponse>>> {
    let filter = query.to_filter().public();
    Ok(Json(list_page(&state, filter).await?))
}

/// Create a snippet owned by the caller
#[utoipa::path(
    post,
    path = "/api/snippets",
    tag = "snippets",
    request_body = SnippetCreate,
    responses(
        (status = 200, description = "Snippet created", body = SnippetResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn create_snippet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(create): Json<SnippetCreate>,
) -> Result<Json<SnippetResponse>> {
    create.validate(&state.config.snippets)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Snippets::new(&mut pool_conn);

    let snippet = repo.create(&SnippetCreateDBRequest::new(current_user.id, create)).await?;

    tracing::debug!(snippet_id = snippet.id, "Created snippet");
    Ok(Json(SnippetResponse::from(snippet)))
}

/// Which usage counter a successful read bumps.
#[derive(Debug, Clone, Copy)]
enum Usage {
    View,
    Copy,
}

/// Fetch a readable snippet and bump one of its usage counters.
async fn read_and_record(state: &AppState, current_user: Option<&CurrentUser>, id: SnippetId, usage: Usage) -> Result<SnippetDBResponse> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Snippets::new(&mut tx);

    let snippet = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
    permissions::require_read(current_user, &snippet)?;

    let snippet = match usage {
        Usage::View => repo.record_view(id).await?,
        Usage::Copy => repo.record_copy(id).await?,
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    Ok(snippet)
}

/// Get a snippet by ID
///
/// Owners can always read their snippets; public snippets are readable by anyone. Each read
/// increments the view counter.
#[utoipa::path(
    get,
    path = "/api/snippets/{id}",
    tag = "snippets",
    params(("id" = i64, Path, description = "Snippet ID")),
    responses(
        (status = 200, description = "Snippet", body = SnippetResponse),
        (status = 401, description = "Authorization header present but invalid", body = crate::errors::ErrorBody),
        (status = 404, description = "Snippet not found or not visible to the caller", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(snippet_id = id))]
pub async fn get_snippet(
    State(state): State<AppState>,
    current_user: Option<CurrentUser>,
    Path(id): Path<SnippetId>,
) -> Result<Json<SnippetResponse>> {
    let snippet = read_and_record(&state, current_user.as_ref(), id, Usage::View).await?;
    Ok(Json(SnippetResponse::from(snippet)))
}

/// Record that a snippet was copied
#[utoipa::path(
    post,
    path = "/api/snippets/{id}/copy",
    tag = "snippets",
    params(("id" = i64, Path, description = "Snippet ID")),
    responses(
        (status = 200, description = "Snippet with its updated copy count", body = SnippetResponse),
        (status = 401, description = "Authorization header present but invalid", body = crate::errors::ErrorBody),
        (status = 404, description = "Snippet not found or not visible to the caller", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(snippet_id = id))]
pub async fn copy_snippet(
    State(state): State<AppState>,
    current_user: Option<CurrentUser>,
    Path(id): Path<SnippetId>,
) -> Result<Json<SnippetResponse>> {
    let snippet = read_and_record(&state, current_user.as_ref(), id, Usage::Copy).await?;
    Ok(Json(SnippetResponse::from(snippet)))
}

/// Update a snippet (partial)
///
/// Only the owner may update. `version` is not changed; `updatedAt` is refreshed.
#[utoipa::path(
    patch,
    path = "/api/snippets/{id}",
    tag = "snippets",
    request_body = SnippetUpdate,
    params(("id" = i64, Path, description = "Snippet ID")),
    responses(
        (status = 200, description = "Updated snippet", body = SnippetResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorBody),
        (status = 403, description = "Caller does not own the snippet", body = crate::errors::ErrorBody),
        (status = 404, description = "Snippet not found", body = crate::errors::ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id, snippet_id = id))]
pub async fn update_snippet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<SnippetId>,
    Json(update): Json<SnippetUpdate>,
) -> Result<Json<SnippetResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Snippets::new(&mut tx);

    let existing = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
    permissions::require_owner(&current_user, &existing, Operation::Update)?;

    update.validate(&state.config.snippets)?;

    let snippet = repo.update(id, &SnippetUpdateDBRequest::from(update)).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    Ok(Json(SnippetResponse::from(snippet)))
}
