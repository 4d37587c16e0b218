//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::PostService;
use quill_core::ports::{Cache, PasswordService, PostRepository, TokenService, UserRepository};
use quill_infra::auth::PasswordCost;
use quill_infra::{
    Argon2PasswordService, InMemoryCache, InMemoryPostRepository, InMemoryUserRepository,
    JwtConfig, JwtTokenService,
};

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use quill_infra::database::{PostgresPostRepository, PostgresUserRepository};

use crate::config::{AppConfig, ListScope};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: PostService,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    /// Revoked token ids, kept until the token would have expired.
    pub revoked_tokens: Arc<dyn Cache>,
    pub list_scope: ListScope,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let (db, users, posts) = Self::init_database(config).await;

        #[cfg(not(feature = "postgres"))]
        let (users, posts) = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Self::in_memory_repositories()
        };

        tracing::info!(list_scope = ?config.list_scope, "Application state initialized");

        Self {
            users,
            posts: PostService::new(posts),
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Self::password_service(config.password_cost)),
            revoked_tokens: Arc::new(InMemoryCache::new()),
            list_scope: config.list_scope,
            #[cfg(feature = "postgres")]
            db,
        }
    }

    /// State over in-memory stores. Used when no database is configured and
    /// by the HTTP tests.
    pub fn in_memory(jwt: JwtConfig, list_scope: ListScope) -> Self {
        let (users, posts) = Self::in_memory_repositories();

        Self {
            users,
            posts: PostService::new(posts),
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::new()),
            revoked_tokens: Arc::new(InMemoryCache::new()),
            list_scope,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    fn password_service(cost: PasswordCost) -> Argon2PasswordService {
        match Argon2PasswordService::with_cost(cost) {
            Ok(service) => service,
            Err(e) => {
                tracing::error!("Invalid ARGON2_* settings ({}); using defaults.", e);
                Argon2PasswordService::new()
            }
        }
    }

    fn in_memory_repositories() -> (Arc<dyn UserRepository>, Arc<dyn PostRepository>) {
        (
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
        )
    }

    #[cfg(feature = "postgres")]
    async fn init_database(
        config: &AppConfig,
    ) -> (
        Option<Arc<DatabaseConnections>>,
        Arc<dyn UserRepository>,
        Arc<dyn PostRepository>,
    ) {
        use migration::{Migrator, MigratorTrait};

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            let (users, posts) = Self::in_memory_repositories();
            return (None, users, posts);
        };

        let connections = match DatabaseConnections::init(db_config).await {
            Ok(connections) => connections,
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                let (users, posts) = Self::in_memory_repositories();
                return (None, users, posts);
            }
        };

        if config.run_migrations {
            match Migrator::up(&connections.main, None).await {
                Ok(()) => tracing::info!("Database migrations applied"),
                Err(e) => tracing::error!("Failed to apply migrations: {}", e),
            }
        }

        let users: Arc<dyn UserRepository> =
            Arc::new(PostgresUserRepository::new(connections.main.clone()));
        let posts: Arc<dyn PostRepository> =
            Arc::new(PostgresPostRepository::new(connections.main.clone()));

        (Some(Arc::new(connections)), users, posts)
    }
}
