//! Group member repository for database operations.
//!
//! Approve and reject lock the group row, then the member row, before
//! checking any rule, so concurrent decisions on the same application
//! serialize and the second one sees the committed status. Group delete
//! takes the group row first as well, so the two never lock in opposite
//! order.

use domain::models::{CurrentUser, Group, GroupMember, NewNotification};
use domain::services::membership::{
    self, ApprovalPlan, MembershipError, RejectionPlan, FALLBACK_DISPLAY_NAME,
};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{GroupEntity, GroupMemberEntity, MemberWithUserEntity, NotificationEntity};
use crate::error::{on_unique_violation, StoreError};
use crate::metrics::{record_rule_rejection, QueryTimer};
use crate::repositories::chat::insert_group_system_message;
use crate::repositories::notification::insert_notification;

const MEMBER_COLUMNS: &str =
    "id, group_id, user_id, role, status, approved_at, created_at, updated_at";

/// Result of an approve call.
#[derive(Debug)]
pub enum ApprovalOutcome {
    /// Row moved to APPROVED; the notification is committed and ready to push.
    Approved {
        member: GroupMemberEntity,
        notification: NotificationEntity,
    },
    /// Row was already approved; nothing was written.
    Unchanged(GroupMemberEntity),
}

/// Result of a reject call.
#[derive(Debug)]
pub enum RejectionOutcome {
    Rejected {
        member: GroupMemberEntity,
        notification: NotificationEntity,
    },
    Unchanged(GroupMemberEntity),
}

fn rule_violation(operation: &'static str, err: MembershipError) -> StoreError {
    record_rule_rejection(operation, err.code());
    StoreError::Rule(err)
}

async fn lock_member(
    conn: &mut PgConnection,
    member_id: Uuid,
) -> Result<Option<GroupMemberEntity>, sqlx::Error> {
    sqlx::query_as::<_, GroupMemberEntity>(&format!(
        "SELECT {} FROM group_members WHERE id = $1 FOR UPDATE",
        MEMBER_COLUMNS
    ))
    .bind(member_id)
    .fetch_optional(conn)
    .await
}

async fn lock_group(conn: &mut PgConnection, group_id: Uuid) -> Result<Group, StoreError> {
    let group = sqlx::query_as::<_, GroupEntity>(
        r#"
        SELECT id, title, description, image_url, interest, region_id, owner_id,
               min_member_count, max_member_count, created_at, updated_at
        FROM groups WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(group_id)
    .fetch_optional(conn)
    .await?;

    group
        .map(Group::from)
        .ok_or(StoreError::Rule(MembershipError::GroupNotFound))
}

/// Locks the group row, then the member row, and checks the actor owns
/// the group.
async fn lock_for_decision(
    conn: &mut PgConnection,
    operation: &'static str,
    member_id: Uuid,
    actor_id: Uuid,
) -> Result<(GroupMemberEntity, Group), StoreError> {
    let group_id: Uuid =
        sqlx::query_scalar("SELECT group_id FROM group_members WHERE id = $1")
            .bind(member_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| rule_violation(operation, MembershipError::MemberNotFound))?;

    let group = match lock_group(&mut *conn, group_id).await {
        // Deleted with its group between the two reads
        Err(StoreError::Rule(MembershipError::GroupNotFound)) => {
            return Err(rule_violation(operation, MembershipError::MemberNotFound))
        }
        other => other?,
    };

    let member = lock_member(&mut *conn, member_id)
        .await?
        .filter(|m| m.group_id == group.id)
        .ok_or_else(|| rule_violation(operation, MembershipError::MemberNotFound))?;

    membership::ensure_owner(&group, actor_id).map_err(|e| rule_violation(operation, e))?;

    Ok((member, group))
}

/// Repository for group membership rows.
#[derive(Clone)]
pub struct GroupMemberRepository {
    pool: PgPool,
}

impl GroupMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupMemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_member_by_id");
        let result = sqlx::query_as::<_, GroupMemberEntity>(&format!(
            "SELECT {} FROM group_members WHERE id = $1",
            MEMBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_group_and_user(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_member_by_group_and_user");
        let result = sqlx::query_as::<_, GroupMemberEntity>(&format!(
            "SELECT {} FROM group_members WHERE group_id = $1 AND user_id = $2",
            MEMBER_COLUMNS
        ))
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create an APPLIED row and the owner's join-request notification.
    ///
    /// A racing duplicate application fails on `group_members_unique_pair`
    /// and surfaces as `AlreadyMember`.
    pub async fn apply(
        &self,
        group: &Group,
        applicant: &CurrentUser,
    ) -> Result<(GroupMemberEntity, NotificationEntity), StoreError> {
        let timer = QueryTimer::new("apply_to_group");
        let mut tx = self.pool.begin().await?;

        let member = sqlx::query_as::<_, GroupMemberEntity>(&format!(
            r#"
            INSERT INTO group_members (group_id, user_id, role, status)
            VALUES ($1, $2, 'member', 'applied')
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(group.id)
        .bind(applicant.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| on_unique_violation(e, MembershipError::AlreadyMember))?;

        let notification = insert_notification(
            &mut tx,
            &NewNotification::join_request(
                group.owner_id,
                group.id,
                &group.title,
                member.id,
                applicant.user_id,
                applicant.name_or(FALLBACK_DISPLAY_NAME),
            ),
        )
        .await?;

        tx.commit().await?;
        timer.record();
        Ok((member, notification))
    }

    /// Approve an application on behalf of the group owner.
    ///
    /// In one transaction: status change, "joined" system message and the
    /// applicant's notification row.
    pub async fn approve(
        &self,
        member_id: Uuid,
        actor_id: Uuid,
    ) -> Result<ApprovalOutcome, StoreError> {
        let timer = QueryTimer::new("approve_group_member");
        let mut tx = self.pool.begin().await?;

        let (member, group) =
            lock_for_decision(&mut tx, "approve_group_member", member_id, actor_id).await?;

        let approved_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM group_members WHERE group_id = $1 AND status = 'approved'",
        )
        .bind(group.id)
        .fetch_one(&mut *tx)
        .await?;

        let plan = membership::plan_approval(
            &GroupMember::from(member.clone()),
            approved_count,
            group.max_member_count,
        )
        .map_err(|e| rule_violation("approve_group_member", e))?;

        if plan == ApprovalPlan::AlreadyApproved {
            tx.commit().await?;
            timer.record();
            return Ok(ApprovalOutcome::Unchanged(member));
        }

        let member = sqlx::query_as::<_, GroupMemberEntity>(&format!(
            r#"
            UPDATE group_members
            SET status = 'approved', approved_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(member.id)
        .fetch_one(&mut *tx)
        .await?;

        let display_name: Option<String> =
            sqlx::query_scalar::<_, Option<String>>("SELECT display_name FROM users WHERE id = $1")
                .bind(member.user_id)
                .fetch_optional(&mut *tx)
                .await?
                .flatten();

        insert_group_system_message(
            &mut tx,
            group.id,
            &membership::member_joined_message(
                display_name.as_deref().unwrap_or(FALLBACK_DISPLAY_NAME),
            ),
        )
        .await?;

        let notification = insert_notification(
            &mut tx,
            &NewNotification::join_approved(member.user_id, group.id, &group.title),
        )
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(ApprovalOutcome::Approved {
            member,
            notification,
        })
    }

    /// Reject an application on behalf of the group owner. The row is kept.
    pub async fn reject(
        &self,
        member_id: Uuid,
        actor_id: Uuid,
    ) -> Result<RejectionOutcome, StoreError> {
        let timer = QueryTimer::new("reject_group_member");
        let mut tx = self.pool.begin().await?;

        let (member, group) =
            lock_for_decision(&mut tx, "reject_group_member", member_id, actor_id).await?;

        let plan = membership::plan_rejection(&GroupMember::from(member.clone()))
            .map_err(|e| rule_violation("reject_group_member", e))?;

        if plan == RejectionPlan::AlreadyRejected {
            tx.commit().await?;
            timer.record();
            return Ok(RejectionOutcome::Unchanged(member));
        }

        let member = sqlx::query_as::<_, GroupMemberEntity>(&format!(
            r#"
            UPDATE group_members
            SET status = 'rejected', approved_at = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(member.id)
        .fetch_one(&mut *tx)
        .await?;

        let notification = insert_notification(
            &mut tx,
            &NewNotification::join_rejected(member.user_id, group.id, &group.title),
        )
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(RejectionOutcome::Rejected {
            member,
            notification,
        })
    }

    /// Hard-delete a membership row (leave or kick).
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_group_member");
        let result = sqlx::query("DELETE FROM group_members WHERE id = $1 AND role = 'member'")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    pub async fn count_approved(&self, group_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_approved_members");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM group_members WHERE group_id = $1 AND status = 'approved'",
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Approved members with their public profile, owner first.
    pub async fn list_approved(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<MemberWithUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_approved_members");
        let result = sqlx::query_as::<_, MemberWithUserEntity>(
            r#"
            SELECT m.id AS member_id, m.user_id, m.role, u.display_name, u.profile_image_url,
                   m.created_at
            FROM group_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.group_id = $1 AND m.status = 'approved'
            ORDER BY (m.role = 'owner') DESC, m.approved_at ASC, m.id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Pending applications, oldest first.
    pub async fn list_applications(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<MemberWithUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_group_applications");
        let result = sqlx::query_as::<_, MemberWithUserEntity>(
            r#"
            SELECT m.id AS member_id, m.user_id, m.role, u.display_name, u.profile_image_url,
                   m.created_at
            FROM group_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.group_id = $1 AND m.status = 'applied'
            ORDER BY m.created_at ASC, m.id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
