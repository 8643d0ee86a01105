use serde::Deserialize;

use crate::database::models::UserInfo;
use crate::error::AppError;
use crate::handlers::registry::{NoArguments, OperationInput};
use crate::services::RequestContext;
use crate::services::auth::AuthPayload;

#[derive(Debug, Deserialize)]
pub struct LoginArgs {
    pub email: String,
    pub password: String,
}

impl OperationInput for LoginArgs {
    fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() {
            return Err(AppError::invalid_argument("Email is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordArgs {
    pub current_password: String,
    pub new_password: String,
}

impl OperationInput for ChangePasswordArgs {
    fn validate(&self) -> Result<(), AppError> {
        if self.new_password.is_empty() {
            return Err(AppError::invalid_argument("New password must not be empty"));
        }
        Ok(())
    }
}

pub async fn login(ctx: &RequestContext, args: LoginArgs) -> Result<AuthPayload, AppError> {
    ctx.services.auth.login(&args.email, &args.password).await
}

pub async fn me(ctx: &RequestContext, _args: NoArguments) -> Result<UserInfo, AppError> {
    let principal = ctx.require_principal()?;
    Ok(ctx.services.auth.me(principal).await?.into())
}

pub async fn change_password(
    ctx: &RequestContext,
    args: ChangePasswordArgs,
) -> Result<bool, AppError> {
    let principal = ctx.require_principal()?;
    ctx.services
        .auth
        .change_password(principal, &args.current_password, &args.new_password)
        .await
}
