//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{
    ObjectStorage, PasswordService, PostRepository, RateLimiter, TokenService, UserRepository,
};
use blog_infra::database::DatabaseConnections;
use blog_infra::{
    Argon2PasswordService, InMemoryObjectStorage, InMemoryPostRepository, InMemoryUserRepository,
    JwtTokenService,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// State backed entirely by in-memory adapters.
    pub fn in_memory(tokens: Arc<dyn TokenService>) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let posts = Arc::new(InMemoryPostRepository::new(users.clone()));

        Self {
            posts,
            users,
            storage: Arc::new(InMemoryObjectStorage::default()),
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
            rate_limiter: None,
            db: None,
        }
    }

    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let mut state = Self::in_memory(Arc::new(JwtTokenService::new(config.jwt.clone())));

        #[cfg(feature = "postgres")]
        {
            use blog_infra::database::{PostgresPostRepository, PostgresUserRepository};

            if let Some(db_config) = &config.database {
                match DatabaseConnections::init(db_config).await {
                    Ok(connections) => {
                        let conn = Arc::new(connections);
                        state.users = Arc::new(PostgresUserRepository::new(conn.main.clone()));
                        state.posts = Arc::new(PostgresPostRepository::new(conn.main.clone()));
                        state.db = Some(conn);
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!(
                    "DATABASE_URL not set. Running without database (in-memory mode)."
                );
            }
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory repositories");

        #[cfg(feature = "supabase")]
        {
            if let Some(storage_config) = &config.storage {
                tracing::info!(bucket = %storage_config.bucket, "Using Supabase storage");
                state.storage = Arc::new(blog_infra::SupabaseStorage::new(storage_config.clone()));
            } else {
                tracing::warn!("SUPABASE_URL not set. Uploads are kept in memory.");
            }
        }

        #[cfg(not(feature = "supabase"))]
        tracing::info!("Running without supabase feature - uploads are kept in memory");

        #[cfg(feature = "rate-limit")]
        {
            state.rate_limiter = Some(Arc::new(blog_infra::InMemoryRateLimiter::new(
                config.rate_limit.clone(),
            )));
        }

        tracing::info!("Application state initialized");

        state
    }
}
