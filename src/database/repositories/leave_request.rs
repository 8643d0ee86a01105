use sqlx::PgPool;

use crate::database::{
    models::{LeaveRequest, LeaveStatus, LeaveStatusUpdate, NewLeaveRequest},
    utils::sql,
};

#[derive(Clone)]
pub struct LeaveRequestRepository {
    pool: PgPool,
}

impl LeaveRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new leave request in PENDING state
    pub async fn create_request(&self, input: NewLeaveRequest) -> Result<LeaveRequest, sqlx::Error> {
        let request = input.into_leave_request();

        sqlx::query_as::<_, LeaveRequest>(&sql(r#"
            INSERT INTO
                leave_requests (
                    id,
                    start_date,
                    end_date,
                    reason,
                    status,
                    employee_id,
                    created_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                start_date,
                end_date,
                reason,
                status,
                employee_id,
                created_at
        "#))
        .bind(&request.id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.reason)
        .bind(request.status)
        .bind(&request.employee_id)
        .bind(request.created_at)
        .fetch_one(&self.pool)
        .await
    }

    /// Get leave requests, optionally for a single employee
    pub async fn get_requests(
        &self,
        employee_id: Option<&str>,
    ) -> Result<Vec<LeaveRequest>, sqlx::Error> {
        sqlx::query_as::<_, LeaveRequest>(&sql(r#"
            SELECT
                id,
                start_date,
                end_date,
                reason,
                status,
                employee_id,
                created_at
            FROM
                leave_requests
            WHERE
                (?::TEXT IS NULL OR employee_id = ?)
            ORDER BY
                created_at DESC
        "#))
        .bind(employee_id)
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_request_by_id(&self, id: &str) -> Result<Option<LeaveRequest>, sqlx::Error> {
        sqlx::query_as::<_, LeaveRequest>(&sql(r#"
            SELECT
                id,
                start_date,
                end_date,
                reason,
                status,
                employee_id,
                created_at
            FROM
                leave_requests
            WHERE
                id = ?
        "#))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Decide a pending request. The status guard in the WHERE clause keeps
    /// decided requests immutable even under concurrent decisions.
    pub async fn decide_request(
        &self,
        id: &str,
        status: LeaveStatus,
    ) -> Result<LeaveStatusUpdate, sqlx::Error> {
        let updated = sqlx::query_as::<_, LeaveRequest>(&sql(r#"
            UPDATE leave_requests
            SET
                status = ?
            WHERE
                id = ?
                AND status = ?
            RETURNING
                id,
                start_date,
                end_date,
                reason,
                status,
                employee_id,
                created_at
        "#))
        .bind(status)
        .bind(id)
        .bind(LeaveStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(request) = updated {
            return Ok(LeaveStatusUpdate::Updated(request));
        }

        Ok(match self.get_request_by_id(id).await? {
            Some(current) => LeaveStatusUpdate::AlreadyDecided(current),
            None => LeaveStatusUpdate::NotFound,
        })
    }
}
