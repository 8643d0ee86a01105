use sqlx::PgPool;

use crate::database::{
    models::{ActivityLog, CreateActivityInput},
    utils::sql,
};

#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Log a new activity
    pub async fn log_activity(&self, input: CreateActivityInput) -> Result<ActivityLog, sqlx::Error> {
        let entry = input.into_activity_log();

        sqlx::query_as::<_, ActivityLog>(&sql(r#"
            INSERT INTO
                activity_logs (
                    id,
                    action,
                    entity,
                    details,
                    user_id,
                    created_at
                )
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                action,
                entity,
                details,
                user_id,
                created_at
        "#))
        .bind(&entry.id)
        .bind(entry.action)
        .bind(&entry.entity)
        .bind(&entry.details)
        .bind(&entry.user_id)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get_activities(&self) -> Result<Vec<ActivityLog>, sqlx::Error> {
        sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT
                id,
                action,
                entity,
                details,
                user_id,
                created_at
            FROM
                activity_logs
            ORDER BY
                created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
