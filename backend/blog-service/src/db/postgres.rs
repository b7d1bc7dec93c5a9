use sqlx::PgPool;

use super::{comment_repo, follow_repo, group_repo, post_repo, user_repo, BlogRepository};
use crate::error::Result;
use crate::models::{
    Comment, CommentView, Group, NewComment, NewPost, Post, PostChanges, PostFilter, PostView,
    User,
};

/// `BlogRepository` over a PostgreSQL pool
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl BlogRepository for PgRepository {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        Ok(user_repo::create_user(&self.pool, username, password_hash).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(user_repo::find_by_username(&self.pool, username).await?)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        Ok(user_repo::find_by_id(&self.pool, id).await?)
    }

    async fn create_group(&self, slug: &str, title: &str, description: &str) -> Result<Group> {
        Ok(group_repo::create_group(&self.pool, slug, title, description).await?)
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        Ok(group_repo::find_by_slug(&self.pool, slug).await?)
    }

    async fn find_group(&self, id: i64) -> Result<Option<Group>> {
        Ok(group_repo::find_by_id(&self.pool, id).await?)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(group_repo::list_groups(&self.pool).await?)
    }

    async fn delete_group(&self, id: i64) -> Result<bool> {
        Ok(group_repo::delete_group(&self.pool, id).await?)
    }

    async fn create_post(&self, post: NewPost) -> Result<Post> {
        Ok(post_repo::create_post(&self.pool, &post).await?)
    }

    async fn find_post(&self, id: i64) -> Result<Option<PostView>> {
        Ok(post_repo::find_post_by_id(&self.pool, id).await?)
    }

    async fn update_post(&self, id: i64, author_id: i64, changes: PostChanges) -> Result<bool> {
        Ok(post_repo::update_post(&self.pool, id, author_id, &changes).await?)
    }

    async fn delete_post(&self, id: i64) -> Result<bool> {
        Ok(post_repo::delete_post(&self.pool, id).await?)
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<usize> {
        let count = post_repo::count_posts(&self.pool, filter).await?;
        Ok(count.max(0) as usize)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PostView>> {
        Ok(post_repo::list_posts(&self.pool, filter, limit as i64, offset as i64).await?)
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment> {
        Ok(comment_repo::create_comment(&self.pool, &comment).await?)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>> {
        Ok(comment_repo::get_comments_by_post(&self.pool, post_id).await?)
    }

    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        Ok(follow_repo::create_follow(&self.pool, user_id, author_id).await?)
    }

    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        Ok(follow_repo::delete_follow(&self.pool, user_id, author_id).await?)
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool> {
        Ok(follow_repo::is_following(&self.pool, user_id, author_id).await?)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
