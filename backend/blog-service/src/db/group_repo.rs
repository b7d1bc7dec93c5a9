use crate::models::Group;
use sqlx::PgPool;

pub async fn create_group(
    pool: &PgPool,
    slug: &str,
    title: &str,
    description: &str,
) -> Result<Group, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        r#"
        INSERT INTO post_groups (slug, title, description)
        VALUES ($1, $2, $3)
        RETURNING id, slug, title, description
        "#,
    )
    .bind(slug)
    .bind(title)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        "SELECT id, slug, title, description FROM post_groups WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>("SELECT id, slug, title, description FROM post_groups WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_groups(pool: &PgPool) -> Result<Vec<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        "SELECT id, slug, title, description FROM post_groups ORDER BY title, id",
    )
    .fetch_all(pool)
    .await
}

/// Delete a group; `ON DELETE SET NULL` detaches its posts
pub async fn delete_group(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM post_groups WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
