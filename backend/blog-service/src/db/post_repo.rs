use crate::models::{NewPost, Post, PostChanges, PostFilter, PostView};
use sqlx::{PgPool, Row};

/// Post columns joined with the author's username and the group
const POST_VIEW_SELECT: &str = r#"
    SELECT p.id, p.text, p.pub_date, p.image,
           p.author_id, u.username AS author_username,
           p.group_id, g.slug AS group_slug, g.title AS group_title
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_groups g ON g.id = p.group_id
"#;

/// WHERE clause for a listing filter plus the value bound to `$1`, if any
fn filter_clause(filter: PostFilter) -> (&'static str, Option<i64>) {
    match filter {
        PostFilter::All => ("TRUE", None),
        PostFilter::Group(group_id) => ("p.group_id = $1", Some(group_id)),
        PostFilter::Author(author_id) => ("p.author_id = $1", Some(author_id)),
        PostFilter::FollowedBy(user_id) => (
            "p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = $1)",
            Some(user_id),
        ),
    }
}

/// Insert a post and return it
pub async fn create_post(pool: &PgPool, post: &NewPost) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (text, author_id, group_id, image)
        VALUES ($1, $2, $3, $4)
        RETURNING id, text, pub_date, author_id, group_id, image
        "#,
    )
    .bind(&post.text)
    .bind(post.author_id)
    .bind(post.group_id)
    .bind(&post.image)
    .fetch_one(pool)
    .await
}

pub async fn find_post_by_id(pool: &PgPool, post_id: i64) -> Result<Option<PostView>, sqlx::Error> {
    let sql = format!("{} WHERE p.id = $1", POST_VIEW_SELECT);

    sqlx::query_as::<_, PostView>(&sql)
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

/// Update a post owned by `author_id`.
/// A `None` image keeps the stored one.
pub async fn update_post(
    pool: &PgPool,
    post_id: i64,
    author_id: i64,
    changes: &PostChanges,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE posts
        SET text = $3, group_id = $4, image = COALESCE($5, image)
        WHERE id = $1 AND author_id = $2
        "#,
    )
    .bind(post_id)
    .bind(author_id)
    .bind(&changes.text)
    .bind(changes.group_id)
    .bind(&changes.image)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a post; comments go with it through the foreign key
pub async fn delete_post(pool: &PgPool, post_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_posts(pool: &PgPool, filter: PostFilter) -> Result<i64, sqlx::Error> {
    let (clause, param) = filter_clause(filter);
    let sql = format!("SELECT COUNT(*) AS count FROM posts p WHERE {}", clause);

    let mut query = sqlx::query(&sql);
    if let Some(value) = param {
        query = query.bind(value);
    }

    let row = query.fetch_one(pool).await?;
    Ok(row.get::<i64, _>("count"))
}

/// One page of a listing, newest first
pub async fn list_posts(
    pool: &PgPool,
    filter: PostFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostView>, sqlx::Error> {
    let (clause, param) = filter_clause(filter);
    let next = if param.is_some() { 2 } else { 1 };
    let sql = format!(
        "{} WHERE {} ORDER BY p.pub_date DESC, p.id DESC LIMIT ${} OFFSET ${}",
        POST_VIEW_SELECT,
        clause,
        next,
        next + 1
    );

    let mut query = sqlx::query_as::<_, PostView>(&sql);
    if let Some(value) = param {
        query = query.bind(value);
    }

    query.bind(limit).bind(offset).fetch_all(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_filter_binds_nothing() {
        assert_eq!(filter_clause(PostFilter::All), ("TRUE", None));
    }

    #[test]
    fn keyed_filters_bind_their_key() {
        assert_eq!(filter_clause(PostFilter::Group(3)).1, Some(3));
        assert_eq!(filter_clause(PostFilter::Author(4)).1, Some(4));
        let (clause, param) = filter_clause(PostFilter::FollowedBy(5));
        assert!(clause.contains("follows"));
        assert_eq!(param, Some(5));
    }
}
