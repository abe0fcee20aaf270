//! Group board: posts and threaded comments for approved members.
//!
//! Reading and writing need an approved membership in the post's group.
//! Editing also needs authorship; deleting needs authorship only, so an
//! author who left can still take their words down.

use domain::models::board::{
    build_comment_tree, CreateCommentRequest, ListCommentsResponse, ListPostsQuery,
    ListPostsResponse, PostRequest, UpdateCommentRequest,
};
use domain::models::{Comment, CurrentUser, GroupMember, Post};
use domain::services::membership;
use domain::services::MembershipError;
use persistence::repositories::{BoardRepository, GroupMemberRepository, GroupRepository};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone)]
pub struct BoardService {
    board: BoardRepository,
    groups: GroupRepository,
    members: GroupMemberRepository,
}

impl BoardService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            board: BoardRepository::new(pool.clone()),
            groups: GroupRepository::new(pool.clone()),
            members: GroupMemberRepository::new(pool),
        }
    }

    async fn require_member(&self, group_id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
        let member = self
            .members
            .find_by_group_and_user(group_id, user_id)
            .await?
            .map(GroupMember::from);
        membership::ensure_approved(member.as_ref())?;
        Ok(())
    }

    async fn load_post(&self, post_id: i64) -> Result<Post, ApiError> {
        self.board
            .find_post(post_id)
            .await?
            .map(Post::from)
            .ok_or(ApiError::Membership(MembershipError::PostNotFound))
    }

    async fn load_comment(&self, comment_id: i64) -> Result<Comment, ApiError> {
        self.board
            .find_comment(comment_id)
            .await?
            .map(Comment::from)
            .ok_or(ApiError::Membership(MembershipError::CommentNotFound))
    }

    pub async fn create_post(
        &self,
        actor: &CurrentUser,
        group_id: Uuid,
        request: &PostRequest,
    ) -> Result<Post, ApiError> {
        membership::ensure_active(actor)?;
        if self.groups.find_by_id(group_id).await?.is_none() {
            return Err(MembershipError::GroupNotFound.into());
        }
        self.require_member(group_id, actor.user_id).await?;

        let post: Post = self
            .board
            .create_post(
                group_id,
                actor.user_id,
                request.title.trim(),
                request.content.trim(),
            )
            .await?
            .into();

        info!(
            post_id = post.id,
            group_id = %group_id,
            author_id = %actor.user_id,
            "Board post created"
        );
        Ok(post)
    }

    pub async fn list_posts(
        &self,
        actor: &CurrentUser,
        group_id: Uuid,
        query: &ListPostsQuery,
    ) -> Result<ListPostsResponse, ApiError> {
        if self.groups.find_by_id(group_id).await?.is_none() {
            return Err(MembershipError::GroupNotFound.into());
        }
        self.require_member(group_id, actor.user_id).await?;

        let limit = query.page_size();
        let data: Vec<Post> = self
            .board
            .list_posts(group_id, query.before, limit)
            .await?
            .into_iter()
            .map(Post::from)
            .collect();

        let next_before = if data.len() as i64 == limit {
            data.last().map(|p| p.id)
        } else {
            None
        };

        debug!(group_id = %group_id, count = data.len(), "Listed board posts");

        Ok(ListPostsResponse {
            count: data.len(),
            data,
            next_before,
        })
    }

    pub async fn get_post(&self, actor: &CurrentUser, post_id: i64) -> Result<Post, ApiError> {
        let post = self.load_post(post_id).await?;
        self.require_member(post.group_id, actor.user_id).await?;
        Ok(post)
    }

    pub async fn update_post(
        &self,
        actor: &CurrentUser,
        post_id: i64,
        request: &PostRequest,
    ) -> Result<Post, ApiError> {
        membership::ensure_active(actor)?;
        let post = self.load_post(post_id).await?;
        membership::ensure_author(post.author_id, actor.user_id)?;
        self.require_member(post.group_id, actor.user_id).await?;

        let post: Post = self
            .board
            .update_post(post_id, request.title.trim(), request.content.trim())
            .await?
            .map(Post::from)
            .ok_or(ApiError::Membership(MembershipError::PostNotFound))?;

        info!(post_id, author_id = %actor.user_id, "Board post updated");
        Ok(post)
    }

    pub async fn delete_post(&self, actor: &CurrentUser, post_id: i64) -> Result<(), ApiError> {
        membership::ensure_active(actor)?;
        let post = self.load_post(post_id).await?;
        membership::ensure_author(post.author_id, actor.user_id)?;

        if self.board.soft_delete_post(post_id).await? == 0 {
            return Err(MembershipError::PostNotFound.into());
        }

        info!(post_id, author_id = %actor.user_id, "Board post deleted");
        Ok(())
    }

    /// Adds a comment, or a reply when `parent_id` names a live comment on
    /// the same post.
    pub async fn create_comment(
        &self,
        actor: &CurrentUser,
        post_id: i64,
        request: &CreateCommentRequest,
    ) -> Result<Comment, ApiError> {
        membership::ensure_active(actor)?;
        let post = self.load_post(post_id).await?;
        self.require_member(post.group_id, actor.user_id).await?;

        if let Some(parent_id) = request.parent_id {
            let parent = self.load_comment(parent_id).await?;
            if parent.post_id != post.id {
                return Err(MembershipError::CommentNotFound.into());
            }
        }

        let comment: Comment = self
            .board
            .create_comment(
                post.id,
                actor.user_id,
                request.parent_id,
                request.content.trim(),
            )
            .await?
            .into();

        info!(
            comment_id = comment.id,
            post_id,
            parent_id = ?comment.parent_id,
            author_id = %actor.user_id,
            "Board comment created"
        );
        Ok(comment)
    }

    /// Threads of a post, oldest first at every level.
    pub async fn list_comments(
        &self,
        actor: &CurrentUser,
        post_id: i64,
    ) -> Result<ListCommentsResponse, ApiError> {
        let post = self.load_post(post_id).await?;
        self.require_member(post.group_id, actor.user_id).await?;

        let flat: Vec<Comment> = self
            .board
            .list_comments(post.id)
            .await?
            .into_iter()
            .map(Comment::from)
            .collect();

        Ok(ListCommentsResponse {
            post_id: post.id,
            data: build_comment_tree(flat),
        })
    }

    pub async fn update_comment(
        &self,
        actor: &CurrentUser,
        comment_id: i64,
        request: &UpdateCommentRequest,
    ) -> Result<Comment, ApiError> {
        membership::ensure_active(actor)?;
        let comment = self.load_comment(comment_id).await?;
        membership::ensure_author(comment.author_id, actor.user_id)?;
        let post = self.load_post(comment.post_id).await?;
        self.require_member(post.group_id, actor.user_id).await?;

        let comment: Comment = self
            .board
            .update_comment(comment_id, request.content.trim())
            .await?
            .map(Comment::from)
            .ok_or(ApiError::Membership(MembershipError::CommentNotFound))?;

        info!(comment_id, author_id = %actor.user_id, "Board comment updated");
        Ok(comment)
    }

    pub async fn delete_comment(
        &self,
        actor: &CurrentUser,
        comment_id: i64,
    ) -> Result<(), ApiError> {
        membership::ensure_active(actor)?;
        let comment = self.load_comment(comment_id).await?;
        membership::ensure_author(comment.author_id, actor.user_id)?;

        if self.board.soft_delete_comment(comment_id).await? == 0 {
            return Err(MembershipError::CommentNotFound.into());
        }

        info!(comment_id, author_id = %actor.user_id, "Board comment deleted");
        Ok(())
    }
}
