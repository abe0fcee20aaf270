//! Group board domain models: posts and threaded comments.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Default and maximum page size for the post timeline.
pub const DEFAULT_POST_PAGE_SIZE: i64 = 10;
pub const MAX_POST_PAGE_SIZE: i64 = 50;

/// A board post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Post {
    pub id: i64,
    pub group_id: Uuid,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment, with its live replies when read as a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub children: Vec<Comment>,
}

/// Request payload for writing or editing a post.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct PostRequest {
    #[validate(
        length(min = 2, max = 120, message = "Title must be between 2 and 120 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: String,

    #[validate(
        length(min = 1, max = 10000, message = "Content must be at most 10000 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub content: String,
}

/// Request payload for a new comment or reply.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateCommentRequest {
    #[validate(
        length(min = 1, max = 1000, message = "Comment must be between 1 and 1000 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub content: String,

    /// Comment being replied to, on the same post.
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateCommentRequest {
    #[validate(
        length(min = 1, max = 1000, message = "Comment must be between 1 and 1000 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub content: String,
}

/// Keyset page over a group's posts, newest first.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ListPostsQuery {
    /// Only posts with a smaller id than this.
    pub before: Option<i64>,
    pub limit: Option<i64>,
}

impl ListPostsQuery {
    pub fn page_size(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_POST_PAGE_SIZE)
            .clamp(1, MAX_POST_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListPostsResponse {
    pub data: Vec<Post>,
    pub count: usize,
    /// Pass as `before` to fetch the next page; absent on the last page.
    pub next_before: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListCommentsResponse {
    pub post_id: i64,
    pub data: Vec<Comment>,
}

/// Nests a flat, oldest-first list of live comments into threads.
///
/// Replies whose parent is not in the list are dropped along with their
/// own replies, so deleting a comment hides its whole subtree.
pub fn build_comment_tree(comments: Vec<Comment>) -> Vec<Comment> {
    let mut by_parent: HashMap<Option<i64>, Vec<Comment>> = HashMap::new();
    for comment in comments {
        by_parent.entry(comment.parent_id).or_default().push(comment);
    }

    fn attach(node: &mut Comment, by_parent: &mut HashMap<Option<i64>, Vec<Comment>>) {
        let mut children = by_parent.remove(&Some(node.id)).unwrap_or_default();
        for child in children.iter_mut() {
            attach(child, by_parent);
        }
        node.children = children;
    }

    let mut roots = by_parent.remove(&None).unwrap_or_default();
    for root in roots.iter_mut() {
        attach(root, &mut by_parent);
    }
    roots
}
