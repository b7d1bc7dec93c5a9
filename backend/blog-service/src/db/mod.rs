/// Database access layer
///
/// This module provides:
/// - `BlogRepository`, the storage interface the services are written against
/// - `PgRepository`, backed by PostgreSQL through per-entity query modules
/// - `MemoryRepository`, an in-process store for tests and local runs
/// - Connection pooling and embedded migrations
pub mod comment_repo;
pub mod follow_repo;
pub mod group_repo;
pub mod memory;
pub mod post_repo;
pub mod postgres;
pub mod user_repo;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::{
    Comment, CommentView, Group, NewComment, NewPost, Post, PostChanges, PostFilter, PostView,
    User,
};

/// Storage operations used by the service layer.
/// Listings are always ordered newest first, ties broken by id.
#[async_trait::async_trait]
pub trait BlogRepository: Send + Sync {
    /// Insert a user; a taken username is a `Conflict`
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_user(&self, id: i64) -> Result<Option<User>>;

    /// Insert a group; a taken slug is a `Conflict`
    async fn create_group(&self, slug: &str, title: &str, description: &str) -> Result<Group>;

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>>;

    async fn find_group(&self, id: i64) -> Result<Option<Group>>;

    /// All groups ordered by title
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// Delete a group. Its posts stay, detached from any group.
    async fn delete_group(&self, id: i64) -> Result<bool>;

    async fn create_post(&self, post: NewPost) -> Result<Post>;

    async fn find_post(&self, id: i64) -> Result<Option<PostView>>;

    /// Apply changes to a post only if `author_id` wrote it.
    /// Returns whether a row was updated.
    async fn update_post(&self, id: i64, author_id: i64, changes: PostChanges) -> Result<bool>;

    /// Delete a post and its comments
    async fn delete_post(&self, id: i64) -> Result<bool>;

    async fn count_posts(&self, filter: PostFilter) -> Result<usize>;

    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PostView>>;

    async fn create_comment(&self, comment: NewComment) -> Result<Comment>;

    /// Comments of a post, newest first
    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>>;

    /// Idempotent; returns true if a new edge was created
    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<bool>;

    /// Idempotent; returns true if an edge was removed
    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool>;

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool>;

    /// Readiness probe
    async fn ping(&self) -> Result<()>;
}

/// Create a PostgreSQL pool from configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| AppError::Internal("DATABASE_URL is not configured".to_string()))?;

    info!(
        "Creating database pool: max_connections={}",
        config.max_connections
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(url)
        .await?;

    Ok(pool)
}

/// Apply the embedded migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
