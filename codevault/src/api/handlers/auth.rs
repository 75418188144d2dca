use axum::extract::State;

use crate::{
    AppState,
    api::{
        extract::Json,
        models::{
            auth::{AuthResponse, AuthSuccessResponse, ChangePasswordRequest, LoginRequest, RegisterRequest},
            users::CurrentUser,
        },
    },
    auth::{
        password::{self, Argon2Params},
        session,
    },
    config::PasswordConfig,
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
    errors::{DUPLICATE_USERNAME_MESSAGE, Error},
};

/// Maximum username length, in characters.
pub const MAX_USERNAME_LENGTH: usize = 50;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

fn validate_username(username: &str) -> Result<(), Error> {
    if username.is_empty() {
        return Err(Error::BadRequest {
            message: "Username is required".to_string(),
        });
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(Error::BadRequest {
            message: format!("Username must be no more than {MAX_USERNAME_LENGTH} characters"),
        });
    }
    if username.trim() != username {
        return Err(Error::BadRequest {
            message: "Username must not start or end with whitespace".to_string(),
        });
    }
    Ok(())
}

fn validate_password(password: &str, config: &PasswordConfig) -> Result<(), Error> {
    let length = password.chars().count();
    if length < config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", config.min_length),
        });
    }
    if length > config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", config.max_length),
        });
    }
    Ok(())
}

fn issue_session(user: &UserDBResponse, state: &AppState) -> Result<AuthResponse, Error> {
    let (token, expires_at) = session::create_session_token(user.id, &user.username, &state.config)?;
    Ok(AuthResponse {
        token,
        user_id: user.id,
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        expires_at,
    })
}

/// Insert a user, reporting a unique-constraint hit the same way as the username pre-check.
async fn insert_user(repo: &mut Users<'_>, request: &UserCreateDBRequest) -> Result<UserDBResponse, Error> {
    repo.create(request).await.map_err(|e| {
        if e.is_duplicate_username() {
            Error::Conflict {
                message: DUPLICATE_USERNAME_MESSAGE.to_string(),
            }
        } else {
            Error::Database(e)
        }
    })
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid input or username already exists", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> Result<Json<AuthResponse>, Error> {
    if !state.config.auth.allow_registration {
        return Err(Error::BadRequest {
            message: "User registration is disabled".to_string(),
        });
    }

    validate_username(&request.username)?;
    validate_password(&request.password, &state.config.auth.password)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    // Pre-check gives a clean error; the unique constraint still catches concurrent registrations
    let mut user_repo = Users::new(&mut tx);
    if user_repo.get_by_username(&request.username).await?.is_some() {
        return Err(Error::Conflict {
            message: DUPLICATE_USERNAME_MESSAGE.to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let params = Argon2Params::from(&state.config.auth.password);
    let password_hash = password::hash_password_blocking(request.password, params).await?;

    let display_name = request
        .display_name
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| request.username.clone());

    let user = insert_user(
        &mut user_repo,
        &UserCreateDBRequest {
            username: request.username,
            password_hash,
            display_name,
        },
    )
    .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!(user_id = user.id, "Registered new user");
    Ok(Json(issue_session(&user, &state)?))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<AuthResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    // Unknown users and wrong passwords are indistinguishable to the caller
    let user = user_repo
        .get_by_username(&request.username)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some(INVALID_CREDENTIALS.to_string()),
        })?;

    let is_valid = password::verify_password_blocking(request.password, user.password_hash.clone()).await?;
    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some(INVALID_CREDENTIALS.to_string()),
        });
    }

    let user = user_repo.touch_last_login(user.id).await?;

    Ok(Json(issue_session(&user, &state)?))
}

/// Change password for the authenticated user
#[utoipa::path(
    post,
    path = "/api/auth/password-change",
    request_body = ChangePasswordRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Password changed successfully", body = AuthSuccessResponse),
        (status = 400, description = "Invalid new password", body = crate::errors::ErrorBody),
        (status = 401, description = "Not authenticated or current password incorrect", body = crate::errors::ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<AuthSuccessResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    // A valid token for a user that no longer exists is still an authentication failure
    let user = user_repo
        .get_by_id(current_user.id)
        .await?
        .ok_or(Error::Unauthenticated { message: None })?;

    let is_valid = password::verify_password_blocking(request.current_password, user.password_hash).await?;
    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Current password is incorrect".to_string()),
        });
    }

    validate_password(&request.new_password, &state.config.auth.password)?;

    let params = Argon2Params::from(&state.config.auth.password);
    let new_password_hash = password::hash_password_blocking(request.new_password, params).await?;

    user_repo
        .update(current_user.id, &UserUpdateDBRequest::password(new_password_hash))
        .await?;

    Ok(Json(AuthSuccessResponse {
        message: "Password changed successfully".to_string(),
    }))
}
