//! Board repository: posts and comments of a group.
//!
//! Deletes are soft. Every read skips deleted rows, and comments of a
//! deleted post are unreachable.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{CommentEntity, PostEntity};
use crate::metrics::QueryTimer;

const POST_SELECT: &str = r#"
    SELECT p.id, p.group_id, p.author_id, u.display_name AS author_name,
           p.title, p.content, p.created_at, p.updated_at
    FROM board_posts p
    JOIN users u ON u.id = p.author_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.post_id, c.author_id, u.display_name AS author_name,
           c.parent_id, c.content, c.created_at, c.updated_at
    FROM board_comments c
    JOIN board_posts p ON p.id = c.post_id AND p.is_deleted = false
    JOIN users u ON u.id = c.author_id
"#;

/// Repository for board posts and comments.
#[derive(Clone)]
pub struct BoardRepository {
    pool: PgPool,
}

impl BoardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_post(
        &self,
        group_id: Uuid,
        author_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<PostEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_board_post");
        let result = sqlx::query_as::<_, PostEntity>(
            r#"
            WITH p AS (
                INSERT INTO board_posts (group_id, author_id, title, content)
                VALUES ($1, $2, $3, $4)
                RETURNING id, group_id, author_id, title, content, created_at, updated_at
            )
            SELECT p.id, p.group_id, p.author_id, u.display_name AS author_name,
                   p.title, p.content, p.created_at, p.updated_at
            FROM p
            JOIN users u ON u.id = p.author_id
            "#,
        )
        .bind(group_id)
        .bind(author_id)
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_post(&self, id: i64) -> Result<Option<PostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_board_post");
        let result = sqlx::query_as::<_, PostEntity>(&format!(
            "{} WHERE p.id = $1 AND p.is_deleted = false",
            POST_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// One page of a group's live posts, newest first.
    pub async fn list_posts(
        &self,
        group_id: Uuid,
        before: Option<i64>,
        limit: i64,
    ) -> Result<Vec<PostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_board_posts");
        let result = sqlx::query_as::<_, PostEntity>(&format!(
            r#"{}
            WHERE p.group_id = $1
              AND p.is_deleted = false
              AND ($2::BIGINT IS NULL OR p.id < $2)
            ORDER BY p.id DESC
            LIMIT $3
            "#,
            POST_SELECT
        ))
        .bind(group_id)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Rewrites a live post. Returns `None` once it is gone.
    pub async fn update_post(
        &self,
        id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<PostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_board_post");
        let updated = sqlx::query(
            r#"
            UPDATE board_posts
            SET title = $2, content = $3, updated_at = NOW()
            WHERE id = $1 AND is_deleted = false
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .execute(&self.pool)
        .await;
        timer.record();

        if updated?.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_post(id).await
    }

    pub async fn soft_delete_post(&self, id: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_board_post");
        let result = sqlx::query(
            r#"
            UPDATE board_posts
            SET is_deleted = true, updated_at = NOW()
            WHERE id = $1 AND is_deleted = false
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    pub async fn create_comment(
        &self,
        post_id: i64,
        author_id: Uuid,
        parent_id: Option<i64>,
        content: &str,
    ) -> Result<CommentEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_board_comment");
        let result = sqlx::query_as::<_, CommentEntity>(
            r#"
            WITH c AS (
                INSERT INTO board_comments (post_id, author_id, parent_id, content)
                VALUES ($1, $2, $3, $4)
                RETURNING id, post_id, author_id, parent_id, content, created_at, updated_at
            )
            SELECT c.id, c.post_id, c.author_id, u.display_name AS author_name,
                   c.parent_id, c.content, c.created_at, c.updated_at
            FROM c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(parent_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// A live comment on a live post.
    pub async fn find_comment(&self, id: i64) -> Result<Option<CommentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_board_comment");
        let result = sqlx::query_as::<_, CommentEntity>(&format!(
            "{} WHERE c.id = $1 AND c.is_deleted = false",
            COMMENT_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Live comments of a post, oldest first.
    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_board_comments");
        let result = sqlx::query_as::<_, CommentEntity>(&format!(
            "{} WHERE c.post_id = $1 AND c.is_deleted = false ORDER BY c.id ASC",
            COMMENT_SELECT
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update_comment(
        &self,
        id: i64,
        content: &str,
    ) -> Result<Option<CommentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_board_comment");
        let updated = sqlx::query(
            r#"
            UPDATE board_comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1 AND is_deleted = false
            "#,
        )
        .bind(id)
        .bind(content)
        .execute(&self.pool)
        .await;
        timer.record();

        if updated?.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_comment(id).await
    }

    pub async fn soft_delete_comment(&self, id: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_board_comment");
        let result = sqlx::query(
            r#"
            UPDATE board_comments
            SET is_deleted = true, updated_at = NOW()
            WHERE id = $1 AND is_deleted = false
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
