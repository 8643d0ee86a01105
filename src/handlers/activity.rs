use crate::database::models::ActivityLogView;
use crate::error::AppError;
use crate::handlers::registry::NoArguments;
use crate::services::RequestContext;

/// Newest first, each entry with its acting user.
pub async fn activity_logs(
    ctx: &RequestContext,
    _args: NoArguments,
) -> Result<Vec<ActivityLogView>, AppError> {
    let logs = ctx.store().list_activity().await?;

    let user_ids: Vec<String> = logs.iter().map(|log| log.user_id.clone()).collect();
    let users = ctx.users.load_many(&user_ids).await?;

    Ok(logs
        .into_iter()
        .zip(users)
        .map(|(log, user)| ActivityLogView {
            log,
            user: user.map(Into::into),
        })
        .collect())
}
