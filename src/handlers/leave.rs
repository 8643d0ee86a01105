use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use crate::database::models::{LeaveRequest, LeaveStatus, LeaveStatusUpdate, NewLeaveRequest};
use crate::error::AppError;
use crate::handlers::registry::{NoArguments, OperationInput};
use crate::services::RequestContext;

/// Instant accepted as RFC 3339, or as a bare `YYYY-MM-DD` meaning midnight UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeArg(pub DateTime<Utc>);

impl<'de> Deserialize<'de> for DateTimeArg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Ok(DateTimeArg(instant.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| DateTimeArg(naive.and_utc()))
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveInput {
    pub start_date: DateTimeArg,
    pub end_date: DateTimeArg,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateLeaveRequestArgs {
    pub input: CreateLeaveInput,
}

// Dates are not ordered against each other here; an end before the start is stored as given.
impl OperationInput for CreateLeaveRequestArgs {
    fn validate(&self) -> Result<(), AppError> {
        if self.input.reason.trim().is_empty() {
            return Err(AppError::invalid_argument("reason is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateLeaveStatusArgs {
    pub id: String,
    pub status: String,
}

impl UpdateLeaveStatusArgs {
    /// Only the two decided states are valid targets.
    fn target_status(&self) -> Result<LeaveStatus, AppError> {
        let status = LeaveStatus::normalize(&self.status).ok_or_else(|| {
            AppError::invalid_argument(format!("Invalid leave status: {}", self.status))
        })?;
        if !status.is_terminal() {
            return Err(AppError::invalid_argument(
                "Leave status can only be changed to APPROVED or REJECTED",
            ));
        }
        Ok(status)
    }
}

impl OperationInput for UpdateLeaveStatusArgs {
    fn validate(&self) -> Result<(), AppError> {
        self.target_status().map(|_| ())
    }
}

pub async fn leave_requests(
    ctx: &RequestContext,
    _args: NoArguments,
) -> Result<Vec<LeaveRequest>, AppError> {
    let principal = ctx.require_principal()?;

    if principal.is_admin() {
        return ctx.store().list_leave_requests(None).await;
    }

    let employee_id = ctx.linked_employee_id().await?;
    ctx.store().list_leave_requests(Some(&employee_id)).await
}

pub async fn create_leave_request(
    ctx: &RequestContext,
    args: CreateLeaveRequestArgs,
) -> Result<LeaveRequest, AppError> {
    let employee_id = ctx.linked_employee_id().await?;
    let input = args.input;

    let request = ctx
        .store()
        .create_leave_request(NewLeaveRequest {
            start_date: input.start_date.0,
            end_date: input.end_date.0,
            reason: input.reason.trim().to_string(),
            employee_id,
        })
        .await?;
    log::info!(
        "Leave request {} created for employee {}",
        request.id,
        request.employee_id
    );

    ctx.services
        .activity
        .log_leave_requested(request.start_date, request.end_date, ctx.principal())
        .await;

    Ok(request)
}

pub async fn update_leave_status(
    ctx: &RequestContext,
    args: UpdateLeaveStatusArgs,
) -> Result<LeaveRequest, AppError> {
    let status = args.target_status()?;

    let request = match ctx.store().decide_leave_request(&args.id, status).await? {
        LeaveStatusUpdate::Updated(request) => request,
        LeaveStatusUpdate::AlreadyDecided(current) => {
            return Err(AppError::Conflict(format!(
                "Leave request has already been {}",
                current.status
            )));
        }
        LeaveStatusUpdate::NotFound => {
            return Err(AppError::not_found("Leave request not found"));
        }
    };
    log::info!("Leave request {} set to {}", request.id, request.status);

    ctx.services
        .activity
        .log_leave_decided(request.status, ctx.principal())
        .await;

    Ok(request)
}
