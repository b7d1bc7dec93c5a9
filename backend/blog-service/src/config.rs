/// Configuration management for Blog Service
///
/// This module handles loading configuration from environment variables
/// (optionally seeded from a `.env` file by `main`).
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Listing cache configuration
    pub cache: CacheConfig,
    /// Session token configuration
    pub session: SessionConfig,
    /// Uploaded media configuration
    pub media: MediaConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL; the in-memory store is used when absent
    pub url: Option<String>,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis URL; an in-process cache is used when absent
    pub redis_url: Option<String>,
    /// TTL of a cached public listing page
    pub index_ttl_secs: u64,
}

/// Session token configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// Uploaded media configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory image uploads are written under
    pub root: String,
}

const DEV_SESSION_SECRET: &str = "dev-only-session-secret-change-me";

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("BLOG_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("BLOG_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                json_logs: std::env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            database: {
                let url = non_empty_env("DATABASE_URL");
                if production && url.is_none() {
                    return Err("DATABASE_URL must be set in production".to_string());
                }

                DatabaseConfig {
                    url,
                    max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                        .ok()
                        .and_then(|c| c.parse().ok())
                        .unwrap_or(10),
                }
            },
            cache: CacheConfig {
                redis_url: non_empty_env("REDIS_URL"),
                index_ttl_secs: std::env::var("INDEX_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(20),
            },
            session: {
                let secret = match non_empty_env("SESSION_SECRET") {
                    Some(secret) => secret,
                    None if production => {
                        return Err("SESSION_SECRET must be set in production".to_string())
                    }
                    None => DEV_SESSION_SECRET.to_string(),
                };

                if production && secret.len() < 32 {
                    return Err("SESSION_SECRET must be at least 32 bytes in production".to_string());
                }

                SessionConfig {
                    secret,
                    ttl_hours: std::env::var("SESSION_TTL_HOURS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(24 * 14),
                }
            },
            media: MediaConfig {
                root: std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
