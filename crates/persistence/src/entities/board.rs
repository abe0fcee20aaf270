//! Board post and comment entities (database row mapping).
//!
//! Both rows are read joined with the author's display name.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for board_posts with the author's name.
#[derive(Debug, Clone, FromRow)]
pub struct PostEntity {
    pub id: i64,
    pub group_id: Uuid,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostEntity> for domain::models::Post {
    fn from(entity: PostEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            author_id: entity.author_id,
            author_name: entity.author_name,
            title: entity.title,
            content: entity.content,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for board_comments with the author's name.
#[derive(Debug, Clone, FromRow)]
pub struct CommentEntity {
    pub id: i64,
    pub post_id: i64,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CommentEntity> for domain::models::Comment {
    fn from(entity: CommentEntity) -> Self {
        Self {
            id: entity.id,
            post_id: entity.post_id,
            author_id: entity.author_id,
            author_name: entity.author_name,
            parent_id: entity.parent_id,
            content: entity.content,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            children: Vec::new(),
        }
    }
}
