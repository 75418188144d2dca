//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `CODEVAULT_CONFIG`
//! environment variable. A missing file is not an error; everything can come from the environment.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `CODEVAULT_` override YAML values
//! 3. **Well-known variables** - `DATABASE_URL`, `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`,
//!    `DB_PASSWORD`, `JWT_SECRET` and `JWT_EXPIRATION_DAYS` (also accepted as
//!    `JWTSETTINGS__EXPIRATIONDAYS`)
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `CODEVAULT_AUTH__JWT__EXPIRATION_DAYS=14` sets the `auth.jwt.expiration_days` field.
//!
//! ## Startup validation
//!
//! [`Config::load`] fails when the JWT secret is missing or shorter than
//! [`MIN_JWT_SECRET_LENGTH`] bytes, or when no database connection information is available.
//! The server refuses to start rather than run with a broken security posture.
//!
//! ```no_run
//! use clap::Parser;
//! use codevault::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::str::FromStr;
use url::Url;

use crate::errors::Error;

/// Minimum length in bytes of the JWT signing secret.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "CODEVAULT_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Built once at startup and shared through [`crate::AppState`]. Nothing reads the environment
/// after this has been loaded.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// PostgreSQL connection settings
    pub database: DatabaseConfig,
    /// Token and password settings
    pub auth: AuthConfig,
    /// Limits applied to snippet input
    pub snippets: SnippetLimitsConfig,
    /// CORS settings for browser clients
    pub cors: CorsConfig,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// Connection pool parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
        }
    }
}

/// Database configuration.
///
/// Either a full connection `url`, or the discrete `host`/`name`/`user`/`password` parts. When
/// both are present the url wins.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub pool: PoolSettings,
}

impl DatabaseConfig {
    /// Build connection options from whichever form of connection info is configured.
    pub fn connect_options(&self) -> Result<PgConnectOptions, Error> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).map_err(|e| Error::Internal {
                operation: format!("Config validation: invalid database url: {e}"),
            });
        }

        match (&self.host, &self.name, &self.user, &self.password) {
            (Some(host), Some(name), Some(user), Some(password)) => Ok(PgConnectOptions::new()
                .host(host)
                .port(self.port.unwrap_or(5432))
                .database(name)
                .username(user)
                .password(password)),
            _ => Err(Error::Internal {
                operation: "Config validation: no database connection configured. \
                    Set DATABASE_URL, or all of DB_HOST, DB_NAME, DB_USER and DB_PASSWORD."
                    .to_string(),
            }),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Session token settings
    pub jwt: JwtConfig,
    /// Password validation and hashing rules
    pub password: PasswordConfig,
    /// Allow new users to self-register
    pub allow_registration: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            password: PasswordConfig::default(),
            allow_registration: true,
        }
    }
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct JwtConfig {
    /// HMAC signing secret, at least [`MIN_JWT_SECRET_LENGTH`] bytes
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    /// Token lifetime in days
    pub expiration_days: u32,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            expiration_days: 7,
        }
    }
}

impl JwtConfig {
    pub fn expiry(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.expiration_days))
    }
}

/// Password validation and Argon2 hashing parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Argon2 memory cost in KiB (default: 19456 KiB = 19 MB, secure for production)
    pub argon2_memory_kib: u32,
    /// Argon2 iterations (default: 2, secure for production)
    pub argon2_iterations: u32,
    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            // Argon2id RFC recommendations
            argon2_memory_kib: 19456,
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

/// Limits applied when creating or updating snippets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnippetLimitsConfig {
    pub max_title_length: usize,
    /// Maximum code body length, in characters
    pub max_code_length: usize,
    pub max_tags: usize,
    pub max_tag_length: usize,
}

impl Default for SnippetLimitsConfig {
    fn default() -> Self {
        Self {
            max_title_length: 200,
            max_code_length: 100_000,
            max_tags: 20,
            max_tag_length: 50,
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            allow_credentials: false,
            max_age: Some(3600),
        }
    }
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            snippets: SnippetLimitsConfig::default(),
            cors: CorsConfig::default(),
            enable_metrics: false,
            enable_otel_export: false,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        match self.auth.jwt.secret.as_deref() {
            None => {
                return Err(Error::Internal {
                    operation: "Config validation: JWT secret is not configured. \
                        Set the JWT_SECRET environment variable or auth.jwt.secret in the config file."
                        .to_string(),
                });
            }
            Some(secret) if secret.len() < MIN_JWT_SECRET_LENGTH => {
                return Err(Error::Internal {
                    operation: format!(
                        "Config validation: JWT secret must be at least {MIN_JWT_SECRET_LENGTH} characters (got {})",
                        secret.len()
                    ),
                });
            }
            Some(_) => {}
        }

        if !(1..=365).contains(&self.auth.jwt.expiration_days) {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: JWT expiration_days must be between 1 and 365 (got {})",
                    self.auth.jwt.expiration_days
                ),
            });
        }

        // Surfaces a missing or unparseable connection at startup rather than on first query
        self.database.connect_options()?;

        let password = &self.auth.password;
        if password.min_length < 1 {
            return Err(Error::Internal {
                operation: "Config validation: Invalid password configuration: min_length must be at least 1".to_string(),
            });
        }
        if password.min_length > password.max_length {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: Invalid password configuration: min_length ({}) cannot be greater than max_length ({})",
                    password.min_length, password.max_length
                ),
            });
        }

        let limits = &self.snippets;
        if limits.max_title_length == 0 || limits.max_code_length == 0 || limits.max_tag_length == 0 {
            return Err(Error::Internal {
                operation: "Config validation: snippet length limits must be positive".to_string(),
            });
        }

        if self.cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.".to_string(),
            });
        }
        let has_wildcard = self.cors.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard));
        if has_wildcard && self.cors.allow_credentials {
            return Err(Error::Internal {
                operation: "Config validation: CORS cannot use wildcard origin '*' with allow_credentials=true. Specify explicit origins."
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("CODEVAULT_").ignore(&["CONFIG"]).split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
            .merge(Env::raw().only(&["DB_HOST"]).map(|_| "database.host".into()))
            .merge(Env::raw().only(&["DB_PORT"]).map(|_| "database.port".into()))
            .merge(Env::raw().only(&["DB_NAME"]).map(|_| "database.name".into()))
            .merge(Env::raw().only(&["DB_USER"]).map(|_| "database.user".into()))
            .merge(Env::raw().only(&["DB_PASSWORD"]).map(|_| "database.password".into()))
            .merge(Env::raw().only(&["JWT_SECRET"]).map(|_| "auth.jwt.secret".into()))
            .merge(
                Env::raw()
                    .only(&["JWT_EXPIRATION_DAYS", "JWTSETTINGS__EXPIRATIONDAYS"])
                    .map(|_| "auth.jwt.expiration_days".into()),
            )
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn args(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.auth.jwt.secret = Some(SECRET.to_string());
        config.database.url = Some("postgres://localhost:5432/codevault".to_string());
        config
    }

    #[test]
    fn test_yaml_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
port: 8080
database:
  url: postgres://localhost/codevault
auth:
  jwt:
    secret: "0123456789abcdef0123456789abcdef"
    expiration_days: 14
  password:
    min_length: 12
snippets:
  max_code_length: 5000
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.port, 8080);
            assert_eq!(config.auth.jwt.expiration_days, 14);
            assert_eq!(config.auth.password.min_length, 12);
            assert_eq!(config.auth.password.max_length, 128); // still default
            assert_eq!(config.snippets.max_code_length, 5000);
            assert_eq!(config.snippets.max_title_length, 200); // still default

            Ok(())
        });
    }

    #[test]
    fn test_well_known_env_vars() {
        Jail::expect_with(|jail| {
            jail.set_env("DB_HOST", "db.internal");
            jail.set_env("DB_NAME", "codevault");
            jail.set_env("DB_USER", "vault");
            jail.set_env("DB_PASSWORD", "p@ss:word");
            jail.set_env("JWT_SECRET", SECRET);
            jail.set_env("JWTSETTINGS__EXPIRATIONDAYS", "3");

            let config = Config::load(&args("missing.yaml"))?;

            assert_eq!(config.database.host.as_deref(), Some("db.internal"));
            assert_eq!(config.database.name.as_deref(), Some("codevault"));
            assert_eq!(config.database.user.as_deref(), Some("vault"));
            assert_eq!(config.database.password.as_deref(), Some("p@ss:word"));
            assert_eq!(config.auth.jwt.secret.as_deref(), Some(SECRET));
            assert_eq!(config.auth.jwt.expiration_days, 3);
            assert!(config.database.connect_options().is_ok());

            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
host: 0.0.0.0
database:
  url: postgres://localhost/codevault
auth:
  jwt:
    secret: "0123456789abcdef0123456789abcdef"
"#,
            )?;

            jail.set_env("CODEVAULT_HOST", "127.0.0.1");
            jail.set_env("CODEVAULT_PORT", "9000");
            jail.set_env("CODEVAULT_CONFIG", "test.yaml");
            jail.set_env("CODEVAULT_AUTH__JWT__EXPIRATION_DAYS", "30");
            jail.set_env("DATABASE_URL", "postgres://override/codevault");

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 9000);
            assert_eq!(config.auth.jwt.expiration_days, 30);
            assert_eq!(config.database.url.as_deref(), Some("postgres://override/codevault"));

            Ok(())
        });
    }

    #[test]
    fn test_short_jwt_secret_is_fatal() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/codevault");
            jail.set_env("JWT_SECRET", "too-short");

            let err = Config::load(&args("missing.yaml")).unwrap_err();
            assert!(err.to_string().contains("at least 32 characters"));

            Ok(())
        });
    }

    #[test]
    fn test_missing_jwt_secret_is_fatal() {
        let mut config = valid_config();
        config.auth.jwt.secret = None;

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("JWT secret is not configured"));
    }

    #[test]
    fn test_missing_database_is_fatal() {
        let mut config = valid_config();
        config.database = DatabaseConfig::default();

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("no database connection configured"));

        // Partial parts are not enough
        config.database.host = Some("localhost".to_string());
        config.database.name = Some("codevault".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_password_lengths() {
        let mut config = valid_config();
        config.auth.password.min_length = 10;
        config.auth.password.max_length = 5;

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("min_length"));
    }

    #[test]
    fn test_expiration_days_bounds() {
        let mut config = valid_config();
        config.auth.jwt.expiration_days = 0;
        assert!(config.validate().is_err());

        config.auth.jwt.expiration_days = 366;
        assert!(config.validate().is_err());

        config.auth.jwt.expiration_days = 1;
        assert!(config.validate().is_ok());
        assert_eq!(config.auth.jwt.expiry(), chrono::Duration::days(1));
    }

    #[test]
    fn test_cors_wildcard_with_credentials_rejected() {
        let mut config = valid_config();
        config.cors.allow_credentials = true;

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("wildcard"));
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let mut config = valid_config();
        config.database.password = Some("hunter2".to_string());

        let rendered = serde_json::to_string(&config).unwrap();
        assert!(!rendered.contains(SECRET));
        assert!(!rendered.contains("hunter2"));
    }
}
