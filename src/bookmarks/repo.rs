use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Bookmark record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bookmark {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Bookmark {
    /// All bookmarks owned by a user. The owner filter lives in the query,
    /// so foreign rows are never even fetched.
    pub async fn list_by_user(db: &PgPool, user_id: i64) -> sqlx::Result<Vec<Bookmark>> {
        sqlx::query_as::<_, Bookmark>(
            r#"
            SELECT id, user_id, title, link, description, created_at, updated_at
            FROM bookmarks
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Fetch by id alone. Ownership is checked by the caller afterwards.
    pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<Bookmark>> {
        sqlx::query_as::<_, Bookmark>(
            r#"
            SELECT id, user_id, title, link, description, created_at, updated_at
            FROM bookmarks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        user_id: i64,
        title: &str,
        link: &str,
        description: Option<&str>,
    ) -> sqlx::Result<Bookmark> {
        sqlx::query_as::<_, Bookmark>(
            r#"
            INSERT INTO bookmarks (user_id, title, link, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, link, description, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(link)
        .bind(description)
        .fetch_one(db)
        .await
    }

    /// Only supplied fields change. `user_id` is absent from the SET list
    /// and can never be altered through this query.
    pub async fn update(
        db: &PgPool,
        id: i64,
        title: Option<&str>,
        link: Option<&str>,
        description: Option<&str>,
    ) -> sqlx::Result<Bookmark> {
        sqlx::query_as::<_, Bookmark>(
            r#"
            UPDATE bookmarks
            SET title       = COALESCE($2, title),
                link        = COALESCE($3, link),
                description = COALESCE($4, description),
                updated_at  = now()
            WHERE id = $1
            RETURNING id, user_id, title, link, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(link)
        .bind(description)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: i64) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM bookmarks WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
