use crate::models::{Comment, CommentView, NewComment};
use sqlx::PgPool;

/// Create a new comment on a post
pub async fn create_comment(pool: &PgPool, comment: &NewComment) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (post_id, author_id, text)
        VALUES ($1, $2, $3)
        RETURNING id, post_id, author_id, text, created
        "#,
    )
    .bind(comment.post_id)
    .bind(comment.author_id)
    .bind(&comment.text)
    .fetch_one(pool)
    .await
}

/// Get comments for a post, newest first
pub async fn get_comments_by_post(
    pool: &PgPool,
    post_id: i64,
) -> Result<Vec<CommentView>, sqlx::Error> {
    sqlx::query_as::<_, CommentView>(
        r#"
        SELECT c.id, c.post_id, c.author_id, u.username AS author_username, c.text, c.created
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = $1
        ORDER BY c.created DESC, c.id DESC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
}
