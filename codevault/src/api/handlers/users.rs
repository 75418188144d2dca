use axum::extract::State;

use crate::{
    AppState,
    api::{
        extract::Json,
        models::users::{CurrentUser, UserResponse, UserUpdate},
    },
    db::{
        handlers::{Repository, Users},
        models::users::UserUpdateDBRequest,
    },
    errors::{Error, Result},
};

/// Maximum display name length, in characters.
const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn get_current_user(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UserResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let user = repo
        .get_by_id(current_user.id)
        .await?
        .ok_or(Error::Unauthenticated { message: None })?;

    Ok(Json(UserResponse::from(user)))
}

/// Update the authenticated user's display name or bio
#[utoipa::path(
    patch,
    path = "/api/users/me",
    request_body = UserUpdate,
    tag = "users",
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn update_current_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(mut update): Json<UserUpdate>,
) -> Result<Json<UserResponse>> {
    if let Some(display_name) = update.display_name.as_mut() {
        *display_name = display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(Error::BadRequest {
                message: "Display name cannot be empty".to_string(),
            });
        }
        if display_name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
            return Err(Error::BadRequest {
                message: format!("Display name must be no more than {MAX_DISPLAY_NAME_LENGTH} characters"),
            });
        }
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let user = repo.update(current_user.id, &UserUpdateDBRequest::new(update)).await?;

    Ok(Json(UserResponse::from(user)))
}
