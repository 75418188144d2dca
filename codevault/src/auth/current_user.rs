use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, instrument, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    config::Config,
    errors::{Error, Result},
};

/// Extract user from the bearer token in the Authorization header, if any.
/// Returns:
/// - None: No Authorization header
/// - Some(Ok(user)): Valid token found and verified
/// - Some(Err(error)): Header present but not a bearer token, or the token is invalid
#[instrument(skip(parts, config))]
fn try_bearer_auth(parts: &Parts, config: &Config) -> Option<Result<CurrentUser>> {
    let auth_header = parts.headers.get(AUTHORIZATION)?;

    let Ok(auth_str) = auth_header.to_str() else {
        return Some(Err(Error::Unauthenticated {
            message: Some("Invalid authorization header".to_string()),
        }));
    };

    // Auth schemes are case-insensitive
    let token = auth_str
        .trim()
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty());
    let Some(token) = token else {
        return Some(Err(Error::Unauthenticated {
            message: Some("Expected a bearer token".to_string()),
        }));
    };

    Some(session::verify_session_token(token, config))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_bearer_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Found bearer authenticated user: {}", user.id);
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("Bearer authentication failed: {:?}", e);
                Err(e)
            }
            None => {
                trace!("No authentication credentials found in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

/// Anonymous access for routes that serve public content: no header means no user, while a
/// header that fails verification is still rejected.
impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Option<Self>> {
        try_bearer_auth(parts, &state.config).transpose()
    }
}
