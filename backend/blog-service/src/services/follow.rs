/// Follow service - follow/unfollow transitions between a user and an author
use std::sync::Arc;
use tracing::debug;

use crate::db::BlogRepository;
use crate::error::{AppError, Result};
use crate::metrics::blog::FOLLOW_TRANSITIONS;
use crate::models::User;

pub struct FollowService {
    repo: Arc<dyn BlogRepository>,
}

impl FollowService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self { repo }
    }

    async fn author(&self, username: &str) -> Result<User> {
        self.repo
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", username)))
    }

    /// Follow the author named `username`. Following yourself or an author
    /// already followed changes nothing. Returns whether an edge was created.
    pub async fn follow(&self, user_id: i64, username: &str) -> Result<bool> {
        let author = self.author(username).await?;

        let created = if author.id == user_id {
            false
        } else {
            self.repo.create_follow(user_id, author.id).await?
        };

        debug!(user_id, author_id = author.id, created, "follow requested");
        FOLLOW_TRANSITIONS
            .with_label_values(&["follow", outcome(created)])
            .inc();
        Ok(created)
    }

    /// Remove the edge if present. Returns whether one was removed.
    pub async fn unfollow(&self, user_id: i64, username: &str) -> Result<bool> {
        let author = self.author(username).await?;
        let removed = self.repo.delete_follow(user_id, author.id).await?;

        debug!(user_id, author_id = author.id, removed, "unfollow requested");
        FOLLOW_TRANSITIONS
            .with_label_values(&["unfollow", outcome(removed)])
            .inc();
        Ok(removed)
    }
}

fn outcome(changed: bool) -> &'static str {
    if changed {
        "changed"
    } else {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRepository;

    async fn setup() -> (FollowService, Arc<MemoryRepository>, User, User) {
        let repo = Arc::new(MemoryRepository::new());
        let author = repo.create_user("author", "hash").await.unwrap();
        let reader = repo.create_user("reader", "hash").await.unwrap();
        (FollowService::new(repo.clone()), repo, author, reader)
    }

    #[tokio::test]
    async fn follow_twice_creates_one_edge() {
        let (service, repo, author, reader) = setup().await;

        assert!(service.follow(reader.id, "author").await.unwrap());
        assert!(!service.follow(reader.id, "author").await.unwrap());
        assert!(repo.is_following(reader.id, author.id).await.unwrap());

        assert!(service.unfollow(reader.id, "author").await.unwrap());
        assert!(!repo.is_following(reader.id, author.id).await.unwrap());
    }

    #[tokio::test]
    async fn unfollow_without_edge_is_noop() {
        let (service, _, _, reader) = setup().await;
        assert!(!service.unfollow(reader.id, "author").await.unwrap());
    }

    #[tokio::test]
    async fn self_follow_never_creates_edge() {
        let (service, repo, author, _) = setup().await;
        assert!(!service.follow(author.id, "author").await.unwrap());
        assert!(!repo.is_following(author.id, author.id).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_author_is_not_found() {
        let (service, _, _, reader) = setup().await;
        assert!(matches!(
            service.follow(reader.id, "ghost").await,
            Err(AppError::NotFound(_))
        ));
    }
}
