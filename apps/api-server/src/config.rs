//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use quill_infra::JwtConfig;
use quill_infra::auth::{DEFAULT_JWT_SECRET, MAX_EXPIRATION_HOURS, PasswordCost};
use quill_infra::database::DatabaseConfig;

/// Which posts `GET /v1/posts` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListScope {
    /// Only the caller's own posts.
    #[default]
    Owned,
    /// Every post. Legacy behavior, opt-in only.
    All,
}

impl FromStr for ListScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owned" | "user" => Ok(ListScope::Owned),
            "all" | "global" => Ok(ListScope::All),
            other => Err(format!("unknown list scope '{other}'")),
        }
    }
}

/// Rate limit settings for the auth endpoints.
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window: Duration,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub run_migrations: bool,
    pub jwt: JwtConfig,
    pub password_cost: PasswordCost,
    pub rate_limit: RateLimitSettings,
    pub list_scope: ListScope,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(100),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(10),
        });

        let list_scope = env::var("POSTS_LIST_SCOPE")
            .ok()
            .and_then(|raw| match raw.parse() {
                Ok(scope) => Some(scope),
                Err(e) => {
                    tracing::warn!("Ignoring POSTS_LIST_SCOPE: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        if list_scope == ListScope::All {
            tracing::warn!(
                "POSTS_LIST_SCOPE=all: GET /v1/posts lists every user's posts. \
                 Read/update/delete stay owner-only."
            );
        }

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            run_migrations: env::var("RUN_MIGRATIONS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            jwt: Self::jwt_from_env(),
            password_cost: Self::password_cost_from_env(),
            rate_limit: RateLimitSettings {
                max_requests: parse_var("RATE_LIMIT_MAX_REQUESTS").unwrap_or(60),
                window: Duration::from_secs(parse_var("RATE_LIMIT_WINDOW_SECS").unwrap_or(60)),
            },
            list_scope,
        }
    }

    fn jwt_from_env() -> JwtConfig {
        let defaults = JwtConfig::default();
        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());

        // Warn if using default secret in production
        if secret == DEFAULT_JWT_SECRET {
            let is_production = env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        let requested = parse_var("JWT_EXPIRATION_HOURS").unwrap_or(defaults.expiration_hours);
        let expiration_hours = clamp_expiration_hours(requested);
        if expiration_hours != requested {
            tracing::warn!(
                requested,
                used = expiration_hours,
                "JWT_EXPIRATION_HOURS out of range, clamped"
            );
        }

        JwtConfig {
            secret,
            expiration_hours,
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }

    fn password_cost_from_env() -> PasswordCost {
        let defaults = PasswordCost::default();

        PasswordCost {
            memory_kib: parse_var("ARGON2_MEMORY_KIB").unwrap_or(defaults.memory_kib),
            iterations: parse_var("ARGON2_ITERATIONS").unwrap_or(defaults.iterations),
            parallelism: parse_var("ARGON2_PARALLELISM").unwrap_or(defaults.parallelism),
        }
    }
}

/// Token lifetimes run from 1 hour to [`MAX_EXPIRATION_HOURS`].
fn clamp_expiration_hours(hours: i64) -> i64 {
    hours.clamp(1, MAX_EXPIRATION_HOURS)
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_scope_parsing() {
        assert_eq!("owned".parse::<ListScope>().unwrap(), ListScope::Owned);
        assert_eq!(" ALL ".parse::<ListScope>().unwrap(), ListScope::All);
        assert_eq!("global".parse::<ListScope>().unwrap(), ListScope::All);
        assert!("everyone".parse::<ListScope>().is_err());
        assert_eq!(ListScope::default(), ListScope::Owned);
    }

    #[test]
    fn test_expiration_hours_are_clamped() {
        assert_eq!(clamp_expiration_hours(24), 24);
        assert_eq!(clamp_expiration_hours(0), 1);
        assert_eq!(clamp_expiration_hours(-5), 1);
        assert_eq!(clamp_expiration_hours(i64::MAX), MAX_EXPIRATION_HOURS);
    }
}
