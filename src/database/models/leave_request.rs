use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reason: String,
    pub status: LeaveStatus,
    pub employee_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reason: String,
    pub employee_id: String,
}

impl NewLeaveRequest {
    pub fn into_leave_request(self) -> LeaveRequest {
        LeaveRequest {
            id: uuid::Uuid::new_v4().to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
            reason: self.reason,
            status: LeaveStatus::Pending,
            employee_id: self.employee_id,
            created_at: Utc::now(),
        }
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum LeaveStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

impl LeaveStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

/// Outcome of a conditional status change.
#[derive(Debug, Clone)]
pub enum LeaveStatusUpdate {
    Updated(LeaveRequest),
    /// The request had already left PENDING; carries its current state.
    AlreadyDecided(LeaveRequest),
    NotFound,
}
