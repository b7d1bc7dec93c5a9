/// Blog Service Library
///
/// Serves the blogging platform: posts grouped into communities, comments,
/// and the follow graph between authors.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and the route table
/// - `models`: Data structures for users, groups, posts, comments, follows
/// - `services`: Business logic layer (listings, feed, follow transitions, accounts)
/// - `db`: Repository trait with PostgreSQL and in-memory implementations
/// - `cache`: Cache for the public post listing
/// - `middleware`: Request context extraction and access policy
/// - `forms`: Form payloads and field validation
/// - `pagination`: Fixed-size page slicing
/// - `security`: Password hashing and session tokens
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod security;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use cache::PageCache;
use db::BlogRepository;
use security::session::SessionKeys;
use services::media::MediaStorage;
use std::sync::Arc;
use std::time::Duration;

/// Shared state handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn BlogRepository>,
    pub cache: Arc<dyn PageCache>,
    pub sessions: Arc<SessionKeys>,
    pub media: Arc<MediaStorage>,
    /// Lifetime of a cached public listing page
    pub index_cache_ttl: Duration,
}

impl AppState {
    pub fn post_service(&self) -> services::PostService {
        services::PostService::with_cache(
            self.repo.clone(),
            self.cache.clone(),
            self.index_cache_ttl,
        )
        .with_media(self.media.clone())
    }

    pub fn comment_service(&self) -> services::CommentService {
        services::CommentService::new(self.repo.clone())
    }

    pub fn follow_service(&self) -> services::FollowService {
        services::FollowService::new(self.repo.clone())
    }

    pub fn feed_service(&self) -> services::FeedService {
        services::FeedService::new(self.repo.clone())
    }

    pub fn account_service(&self) -> services::AccountService {
        services::AccountService::new(self.repo.clone())
    }
}
