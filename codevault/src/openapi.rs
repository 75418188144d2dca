//! OpenAPI documentation for the JSON API.
//!
//! Served as JSON at `/api-docs/openapi.json` and rendered with Scalar at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{api, errors};

/// Registers the bearer token scheme referenced by protected endpoints.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearer_auth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token returned by `/api/auth/register` or `/api/auth/login`:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CodeVault API",
        description = "Personal code-snippet storage. `PUT /api/snippets/{id}` is accepted as an alias of `PATCH`."
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::change_password,
        api::handlers::users::get_current_user,
        api::handlers::users::update_current_user,
        api::handlers::snippets::list_snippets,
        api::handlers::snippets::list_public_snippets,
        api::handlers::snippets::create_snippet,
        api::handlers::snippets::get_snippet,
        api::handlers::snippets::update_snippet,
        api::handlers::snippets::copy_snippet,
    ),
    components(
        schemas(
            api::models::auth::RegisterRequest,
            api::models::auth::LoginRequest,
            api::models::auth::ChangePasswordRequest,
            api::models::auth::AuthResponse,
            api::models::auth::AuthSuccessResponse,
            api::models::users::UserResponse,
            api::models::users::UserUpdate,
            api::models::snippets::SnippetCreate,
            api::models::snippets::SnippetUpdate,
            api::models::snippets::SnippetResponse,
            errors::ErrorBody,
        )
    ),
    tags(
        (name = "authentication", description = "Registration, login and password management"),
        (name = "users", description = "The authenticated user's profile"),
        (name = "snippets", description = "Snippet storage and browsing"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/password-change",
            "/api/users/me",
            "/api/snippets",
            "/api/snippets/public",
            "/api/snippets/{id}",
            "/api/snippets/{id}/copy",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
