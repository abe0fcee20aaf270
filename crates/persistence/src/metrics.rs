//! Database metrics collection.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record how long a query or transaction took.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!("buddy_db_query_duration_seconds", "query" => query_name).record(duration_secs);
}

/// Count a membership transaction that was aborted by a rule violation.
pub fn record_rule_rejection(operation: &'static str, reason: &'static str) {
    counter!(
        "buddy_db_rule_rejections_total",
        "operation" => operation,
        "reason" => reason
    )
    .increment(1);
}

/// Record connection pool gauges.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("buddy_db_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("buddy_db_connections_idle").set(idle as f64);
}

/// Times a database operation and records it on `record`.
///
/// ```ignore
/// let timer = QueryTimer::new("find_group_by_id");
/// let result = sqlx::query_as::<_, GroupEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_keeps_name() {
        let timer = QueryTimer::new("approve_member");
        assert_eq!(timer.query_name, "approve_member");
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        QueryTimer::new("count_unread").record();
        record_rule_rejection("approve_member", "group_full");
    }
}
