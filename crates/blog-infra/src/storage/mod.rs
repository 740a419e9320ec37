//! Object storage implementations - Supabase Storage and in-memory fallback.

mod memory;

#[cfg(feature = "supabase")]
mod supabase;

pub use memory::{InMemoryObjectStorage, StoredObject};

#[cfg(feature = "supabase")]
pub use supabase::SupabaseStorage;

/// Default bucket uploaded covers land in.
pub const DEFAULT_BUCKET: &str = "blog-files";

/// Connection settings for a Supabase Storage bucket.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Service-role key (preferred) or anon key.
    pub key: String,
    pub bucket: String,
}

impl StorageConfig {
    /// Load from `SUPABASE_*` variables. `None` when no project URL is set.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("SUPABASE_URL").ok()?;

        let key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .or_else(|_| std::env::var("SUPABASE_ANON_KEY"))
            .unwrap_or_else(|_| {
                tracing::error!("SUPABASE_SERVICE_ROLE_KEY and SUPABASE_ANON_KEY are both missing");
                String::new()
            });

        Some(Self {
            url: url.trim_end_matches('/').to_string(),
            key,
            bucket: std::env::var("SUPABASE_BUCKET_NAME")
                .unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
        })
    }
}
