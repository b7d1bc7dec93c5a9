/// Comment service - comments attached to a post
use std::sync::Arc;
use tracing::info;

use crate::db::BlogRepository;
use crate::error::{AppError, Result};
use crate::models::{Comment, NewComment};

pub struct CommentService {
    repo: Arc<dyn BlogRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self { repo }
    }

    /// Add a comment to an existing post
    pub async fn add_comment(&self, post_id: i64, author_id: i64, text: String) -> Result<Comment> {
        if self.repo.find_post(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        let comment = self
            .repo
            .create_comment(NewComment {
                post_id,
                author_id,
                text,
            })
            .await?;

        info!(comment_id = comment.id, post_id, author_id, "comment created");
        Ok(comment)
    }
}
