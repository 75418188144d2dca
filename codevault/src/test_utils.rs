use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use sqlx::PgPool;

use crate::{
    AppState,
    auth::{password, session},
    config::{AuthConfig, Config, DatabaseConfig, JwtConfig, PasswordConfig},
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
};

/// Password given to every user made by [`create_test_user`].
pub const TEST_PASSWORD: &str = "pw12345678";

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig {
            // Tests are handed a pool by sqlx::test, this is never dialled
            url: Some("postgres://localhost/codevault_test".to_string()),
            ..Default::default()
        },
        auth: AuthConfig {
            jwt: JwtConfig {
                secret: Some("test-secret-key-for-testing-only-0123456789".to_string()),
                expiration_days: 7,
            },
            password: PasswordConfig {
                // Minimal Argon2 cost so the suite stays fast
                argon2_memory_kib: 128,
                argon2_iterations: 1,
                argon2_parallelism: 1,
                ..Default::default()
            },
            allow_registration: true,
        },
        ..Default::default()
    }
}

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::builder().db(pool).config(create_test_config()).build()
}

/// Insert a user with [`TEST_PASSWORD`] and return it with a valid session token.
pub async fn create_test_user(pool: &PgPool, config: &Config, username: &str) -> (UserDBResponse, String) {
    let password_hash = password::hash_password(TEST_PASSWORD, (&config.auth.password).into()).expect("Failed to hash password");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let user = users_repo
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            password_hash,
            display_name: username.to_string(),
        })
        .await
        .expect("Failed to create test user");

    let (token, _) = session::create_session_token(user.id, &user.username, config).expect("Failed to create session token");

    (user, token)
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    let value = HeaderValue::from_str(&format!("Bearer {token}")).expect("Invalid bearer header");
    (AUTHORIZATION, value)
}
