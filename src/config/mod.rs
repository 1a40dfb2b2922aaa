use dotenv::dotenv;
use std::env;
use std::time::Duration;

use crate::application::cache::DEFAULT_CACHE_TIME;
use crate::application::sync::DEFAULT_SNAPSHOT_LIMIT;

/// Configuration for the wallet API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API base URL
    pub url: String,
    /// Access token used until the session replaces it
    pub access_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Configuration for the local database
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
}

/// Configuration for the sync engine and query cache
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Snapshots fetched per page
    pub snapshot_page_limit: u64,
    /// Age after which a cached query result is re-fetched; zero disables it
    pub query_stale_time_ms: u64,
    /// Age after which an unread stale result is dropped from the cache
    pub query_cache_time_ms: u64,
}

impl SyncConfig {
    pub fn stale_after(&self) -> Option<Duration> {
        match self.query_stale_time_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn cache_time(&self) -> Duration {
        Duration::from_millis(self.query_cache_time_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            snapshot_page_limit: DEFAULT_SNAPSHOT_LIMIT,
            query_stale_time_ms: 100,
            query_cache_time_ms: DEFAULT_CACHE_TIME.as_millis() as u64,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API client configuration
    pub api: ApiConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Sync configuration
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        // Ensure .env file is loaded
        dotenv().ok();

        let api_config = ApiConfig {
            url: env::var("MIXIN_API_URL")
                .unwrap_or_else(|_| "https://api.mixin.one".to_string())
                .trim_end_matches('/')
                .to_string(),
            access_token: env::var("MIXIN_ACCESS_TOKEN")
                .ok()
                .filter(|token| !token.is_empty()),
            timeout_secs: env::var("API_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u64>()
                .unwrap_or(10),
        };

        let database_config = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://wallet.db?mode=rwc".to_string()),
            max_connections: env::var("DB_POOL_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        };

        let defaults = SyncConfig::default();
        let sync_config = SyncConfig {
            snapshot_page_limit: env::var("SNAPSHOT_PAGE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.snapshot_page_limit),
            query_stale_time_ms: env::var("QUERY_STALE_TIME_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.query_stale_time_ms),
            query_cache_time_ms: env::var("QUERY_CACHE_TIME_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.query_cache_time_ms),
        };

        Self {
            api: api_config,
            database: database_config,
            sync: sync_config,
        }
    }
}
