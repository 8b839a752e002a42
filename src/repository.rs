use crate::models::{Comment, CreateCommentRequest, CreatePostRequest, Post, PostFilter, UpdatePostRequest, User};
use crate::search::contains_pattern;
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The abstract contract for all persistence operations. Handlers only see this
/// trait, so tests can swap in an in-memory implementation.
///
/// Every method surfaces backend failures as `sqlx::Error`; the handler decides the
/// client-facing message.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;

    // --- Posts ---
    /// Filtered listing, newest first, with the author's email resolved.
    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>, sqlx::Error>;
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error>;
    async fn create_post(&self, req: CreatePostRequest, author_id: Uuid) -> Result<Post, sqlx::Error>;
    /// Partial update. `None` when no post has this id.
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> Result<Option<Post>, sqlx::Error>;
    /// Deletes the post and its comments atomically. Returns the number of comments
    /// removed, or `None` when the post did not exist.
    async fn delete_post(&self, id: Uuid) -> Result<Option<u64>, sqlx::Error>;
    /// Every post other than `exclude_id` whose title matches `title_pattern`
    /// case-insensitively.
    async fn related_posts(&self, exclude_id: Uuid, title_pattern: &str) -> Result<Vec<Post>, sqlx::Error>;

    // --- Comments ---
    async fn get_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, sqlx::Error>;
    async fn create_comment(&self, req: CreateCommentRequest) -> Result<Comment, sqlx::Error>;
    async fn count_comments(&self) -> Result<i64, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The production implementation of `Repository`, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = "id, title, content, category, location, author_id, created_at";

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, username, email, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// list_posts
    ///
    /// Composes the optional filters with QueryBuilder so every user-supplied value is
    /// a bound parameter. The search term is matched with ILIKE after escaping, so it
    /// behaves as a plain substring.
    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>, sqlx::Error> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            r#"
            SELECT
                p.id, p.title, p.content, p.category, p.location, p.author_id,
                u.email AS author_email, p.created_at
            FROM posts p
            LEFT JOIN users u ON u.id = p.author_id
            WHERE TRUE
            "#,
        );

        if let Some(search) = filter.search {
            let pattern = contains_pattern(&search);
            builder.push(" AND (p.title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR p.content ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        if let Some(category) = filter.category {
            builder.push(" AND p.category = ");
            builder.push_bind(category);
        }

        if let Some(location) = filter.location {
            builder.push(" AND p.location = ");
            builder.push_bind(location);
        }

        builder.push(" ORDER BY p.created_at DESC");

        builder.build_query_as::<Post>().fetch_all(&self.pool).await
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_post(&self, req: CreatePostRequest, author_id: Uuid) -> Result<Post, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (id, title, content, category, location, author_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(req.title)
        .bind(req.content)
        .bind(req.category)
        .bind(req.location)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
    }

    /// update_post
    ///
    /// COALESCE keeps the stored value for every required field the request leaves as
    /// `None`. The nullable columns carry a "present" flag so an explicit null clears them.
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                category = CASE WHEN $4 THEN $5 ELSE category END,
                location = CASE WHEN $6 THEN $7 ELSE location END,
                author_id = COALESCE($8, author_id)
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.content)
        .bind(req.category.is_some())
        .bind(req.category.flatten())
        .bind(req.location.is_some())
        .bind(req.location.flatten())
        .bind(req.author_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// delete_post
    ///
    /// Both deletes run in one transaction: a failure on the comment cascade rolls
    /// the post delete back too.
    async fn delete_post(&self, id: Uuid) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let comments = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(comments.rows_affected()))
    }

    async fn related_posts(&self, exclude_id: Uuid, title_pattern: &str) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts
            WHERE id <> $1 AND title ~* $2
            ORDER BY created_at DESC
            "#
        ))
        .bind(exclude_id)
        .bind(title_pattern)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.post_id, c.user_id, c.text, c.created_at, u.username, u.email
            FROM comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
    }

    /// create_comment
    ///
    /// Inserts and joins `users` in one statement so the returned comment carries the
    /// commenter's username and email like the ones served by `get_comments`.
    async fn create_comment(&self, req: CreateCommentRequest) -> Result<Comment, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (id, post_id, user_id, text, created_at)
                VALUES ($1, $2, $3, $4, NOW())
                RETURNING id, post_id, user_id, text, created_at
            )
            SELECT i.id, i.post_id, i.user_id, i.text, i.created_at, u.username, u.email
            FROM inserted i
            LEFT JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.post_id)
        .bind(req.user_id)
        .bind(req.text)
        .fetch_one(&self.pool)
        .await
    }

    async fn count_comments(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await
    }
}
