//! Group repository for database operations.

use domain::models::group::{CreateGroupRequest, UpdateGroupRequest};
use domain::models::InterestType;
use domain::services::membership;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ChatRoomEntity, GroupEntity, GroupSummaryEntity, InterestTypeDb};
use crate::error::StoreError;
use crate::metrics::QueryTimer;
use crate::repositories::chat::{insert_room, insert_system_message};

const GROUP_COLUMNS: &str = "id, title, description, image_url, interest, region_id, owner_id, \
     min_member_count, max_member_count, created_at, updated_at";

/// Listing projection shared by every group list query.
const SUMMARY_SELECT: &str = r#"
    SELECT g.id, g.title, g.description, g.image_url, g.interest,
           r.name AS region_name,
           (SELECT COUNT(*) FROM group_members m
             WHERE m.group_id = g.id AND m.status = 'approved') AS member_count,
           g.min_member_count, g.max_member_count, g.created_at
    FROM groups g
    JOIN regions r ON r.id = g.region_id
"#;

/// Repository for group-related database operations.
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a group together with its chat room and the owner's membership.
    ///
    /// All four writes (group, room, owner row, opening system message)
    /// commit together or not at all.
    pub async fn create_with_room(
        &self,
        owner_id: Uuid,
        owner_name: &str,
        request: &CreateGroupRequest,
    ) -> Result<(GroupEntity, ChatRoomEntity), StoreError> {
        let timer = QueryTimer::new("create_group_with_room");
        let mut tx = self.pool.begin().await?;

        let group = sqlx::query_as::<_, GroupEntity>(&format!(
            r#"
            INSERT INTO groups (title, description, image_url, interest, region_id, owner_id,
                                min_member_count, max_member_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            GROUP_COLUMNS
        ))
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.image_url)
        .bind(InterestTypeDb::from(request.interest))
        .bind(request.region_id)
        .bind(owner_id)
        .bind(request.min_member_count)
        .bind(request.max_member_count)
        .fetch_one(&mut *tx)
        .await?;

        let room = insert_room(&mut tx, group.id).await?;

        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id, role, status, approved_at)
            VALUES ($1, $2, 'owner', 'approved', NOW())
            "#,
        )
        .bind(group.id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        insert_system_message(
            &mut tx,
            room.id,
            &membership::group_created_message(owner_name),
        )
        .await?;

        tx.commit().await?;
        timer.record();
        Ok((group, room))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_by_id");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            "SELECT {} FROM groups WHERE id = $1",
            GROUP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateGroupRequest,
    ) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_group");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            r#"
            UPDATE groups
            SET title = $2,
                description = $3,
                image_url = $4,
                interest = $5,
                region_id = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            GROUP_COLUMNS
        ))
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.image_url)
        .bind(InterestTypeDb::from(request.interest))
        .bind(request.region_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a group. Members, the chat room and its messages cascade.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_group");
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// List groups, optionally filtered by interest and/or region.
    pub async fn list(
        &self,
        interest: Option<InterestType>,
        region_id: Option<i64>,
    ) -> Result<Vec<GroupSummaryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_groups");
        let result = sqlx::query_as::<_, GroupSummaryEntity>(&format!(
            r#"
            {}
            WHERE ($1::interest_type IS NULL OR g.interest = $1)
              AND ($2::BIGINT IS NULL OR g.region_id = $2)
            ORDER BY g.created_at DESC, g.id
            "#,
            SUMMARY_SELECT
        ))
        .bind(interest.map(InterestTypeDb::from))
        .bind(region_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Groups in which the user is an approved member.
    pub async fn list_for_member(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<GroupSummaryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_groups_for_member");
        let result = sqlx::query_as::<_, GroupSummaryEntity>(&format!(
            r#"
            {}
            WHERE EXISTS (
                SELECT 1 FROM group_members m
                WHERE m.group_id = g.id AND m.user_id = $1 AND m.status = 'approved'
            )
            ORDER BY g.created_at DESC, g.id
            "#,
            SUMMARY_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Groups the user has no membership row in that match their interests
    /// or region.
    ///
    /// Groups matching both come first, then groups matching either; each
    /// tier is newest first.
    pub async fn recommended(
        &self,
        user_id: Uuid,
        interests: &[InterestType],
        region_id: i64,
    ) -> Result<Vec<GroupSummaryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("recommended_groups");
        let interests: Vec<&str> = interests.iter().map(|i| i.as_str()).collect();
        let result = sqlx::query_as::<_, GroupSummaryEntity>(&format!(
            r#"
            {}
            WHERE NOT EXISTS (
                SELECT 1 FROM group_members m
                WHERE m.group_id = g.id AND m.user_id = $1
            )
              AND (g.interest::text = ANY($2) OR g.region_id = $3)
            ORDER BY
                CASE WHEN g.interest::text = ANY($2) AND g.region_id = $3 THEN 1 ELSE 2 END,
                g.created_at DESC,
                g.id
            "#,
            SUMMARY_SELECT
        ))
        .bind(user_id)
        .bind(&interests)
        .bind(region_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
