use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::database::Store;
use crate::database::models::{
    ActionType, CreateActivityInput, Employee, EntityType, LeaveStatus,
};
use crate::services::token::Principal;

/// Best-effort audit trail for successful mutations.
#[derive(Clone)]
pub struct ActivityLogger {
    store: Arc<dyn Store>,
}

impl ActivityLogger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Appends one entry for `actor`. Anonymous mutations are not recorded and
    /// a failed write is only logged; the caller's mutation has already
    /// committed.
    pub async fn record(
        &self,
        action: ActionType,
        entity: &str,
        details: String,
        actor: Option<&Principal>,
    ) {
        let Some(actor) = actor else {
            log::debug!("Skipping audit entry for anonymous {} on {}", action, entity);
            return;
        };

        let input = CreateActivityInput {
            action,
            entity: entity.to_string(),
            details,
            user_id: actor.id.clone(),
        };

        if let Err(e) = self.store.append_activity(input).await {
            log::warn!(
                "Failed to record {} activity on {} for user {}: {}",
                action,
                entity,
                actor.id,
                e
            );
        }
    }

    pub async fn log_employee_activity(
        &self,
        action: ActionType,
        employee: &Employee,
        actor: Option<&Principal>,
    ) {
        let verb = match action {
            ActionType::Create => "Created",
            ActionType::Update => "Updated",
            ActionType::Delete => "Deleted",
        };
        self.record(
            action,
            EntityType::EMPLOYEE,
            format!("{} employee {}", verb, employee.name),
            actor,
        )
        .await;
    }

    pub async fn log_leave_requested(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        actor: Option<&Principal>,
    ) {
        self.record(
            ActionType::Create,
            EntityType::LEAVE_REQUEST,
            format!(
                "Requested leave from {} to {}",
                start_date.date_naive(),
                end_date.date_naive()
            ),
            actor,
        )
        .await;
    }

    pub async fn log_leave_decided(&self, status: LeaveStatus, actor: Option<&Principal>) {
        self.record(
            ActionType::Update,
            EntityType::LEAVE_REQUEST,
            format!("Updated leave request status to {}", status),
            actor,
        )
        .await;
    }
}
