//! Region repository for database operations.

use sqlx::PgPool;

use crate::entities::RegionEntity;
use crate::metrics::QueryTimer;

/// Repository for the seeded regions table.
#[derive(Clone)]
pub struct RegionRepository {
    pool: PgPool,
}

impl RegionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<RegionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_regions");
        let result = sqlx::query_as::<_, RegionEntity>(
            "SELECT id, province, name FROM regions ORDER BY province, name",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<RegionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_region_by_id");
        let result = sqlx::query_as::<_, RegionEntity>(
            "SELECT id, province, name FROM regions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
