use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;
use super::user::UserInfo;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ActionType {
        Create => "CREATE",
        Update => "UPDATE",
        Delete => "DELETE",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub action: ActionType,
    pub entity: String,
    pub details: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityInput {
    pub action: ActionType,
    pub entity: String,
    pub details: String,
    pub user_id: String,
}

impl CreateActivityInput {
    pub fn into_activity_log(self) -> ActivityLog {
        ActivityLog {
            id: uuid::Uuid::new_v4().to_string(),
            action: self.action,
            entity: self.entity,
            details: self.details,
            user_id: self.user_id,
            created_at: Utc::now(),
        }
    }
}

/// Activity entry with the acting user resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogView {
    #[serde(flatten)]
    pub log: ActivityLog,
    pub user: Option<UserInfo>,
}

// Entity names written to the log
#[allow(non_snake_case)]
pub mod EntityType {
    pub const EMPLOYEE: &str = "Employee";
    pub const LEAVE_REQUEST: &str = "LeaveRequest";
}
