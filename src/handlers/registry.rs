//! Name-to-handler dispatch table for the operation API.

use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::database::models::UserRole;
use crate::error::AppError;
use crate::handlers::{activity, auth, dashboard, employees, leave};
use crate::services::{RequestContext, RoleRequirement, authorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Runs without any principal.
    Public,
    Roles(&'static [RoleRequirement]),
}

pub type OperationFuture<'a> = LocalBoxFuture<'a, Result<Value, AppError>>;
pub type Dispatch = for<'a> fn(&'a RequestContext, Value) -> OperationFuture<'a>;

#[derive(Clone, Copy)]
pub struct OperationSpec {
    pub name: &'static str,
    pub kind: OperationKind,
    pub access: Access,
    pub dispatch: Dispatch,
}

/// Typed arguments of an operation. `validate` runs after decoding.
pub trait OperationInput: DeserializeOwned {
    fn validate(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Arguments of operations that take none; extra keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct NoArguments {}

impl OperationInput for NoArguments {}

pub fn decode_input<T: OperationInput>(args: Value) -> Result<T, AppError> {
    let args = match args {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    let input: T = serde_json::from_value(args)
        .map_err(|e| AppError::invalid_argument(format!("Malformed arguments: {}", e)))?;
    input.validate()?;
    Ok(input)
}

pub fn encode_output<T: Serialize>(output: T) -> Result<Value, AppError> {
    serde_json::to_value(output).map_err(|e| {
        log::error!("Failed to encode operation output: {}", e);
        AppError::internal_server_error()
    })
}

/// Builds an [`OperationSpec`] around an `async fn(&RequestContext, Input) -> Result<Output, AppError>`.
macro_rules! operation {
    ($name:literal, $kind:expr, $access:expr, $handler:path) => {{
        fn dispatch<'a>(ctx: &'a RequestContext, args: Value) -> OperationFuture<'a> {
            Box::pin(async move {
                let input = decode_input(args)?;
                let output = $handler(ctx, input).await?;
                encode_output(output)
            })
        }
        OperationSpec {
            name: $name,
            kind: $kind,
            access: $access,
            dispatch,
        }
    }};
}

const ADMIN: &[RoleRequirement] = &[RoleRequirement::Role(UserRole::Admin)];
const EMPLOYEE: &[RoleRequirement] = &[RoleRequirement::Role(UserRole::Employee)];
const ADMIN_OR_EMPLOYEE: &[RoleRequirement] = &[
    RoleRequirement::Role(UserRole::Admin),
    RoleRequirement::Role(UserRole::Employee),
];
const OR_SELF: &[RoleRequirement] = &[RoleRequirement::OrSelf];

use Access::{Public, Roles};
use OperationKind::{Mutation, Query};

pub struct OperationRegistry {
    operations: BTreeMap<&'static str, OperationSpec>,
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationRegistry {
    pub fn new() -> Self {
        let specs = [
            operation!("login", Mutation, Public, auth::login),
            operation!("me", Query, Roles(EMPLOYEE), auth::me),
            operation!("changePassword", Mutation, Roles(EMPLOYEE), auth::change_password),
            operation!("employee", Query, Roles(EMPLOYEE), employees::employee),
            operation!("employees", Query, Roles(EMPLOYEE), employees::employees),
            operation!("exportEmployees", Query, Roles(ADMIN), employees::export_employees),
            operation!("createEmployee", Mutation, Roles(ADMIN), employees::create_employee),
            operation!("updateEmployee", Mutation, Roles(OR_SELF), employees::update_employee),
            operation!("deleteEmployee", Mutation, Roles(ADMIN), employees::delete_employee),
            operation!("leaveRequests", Query, Roles(EMPLOYEE), leave::leave_requests),
            operation!("createLeaveRequest", Mutation, Roles(EMPLOYEE), leave::create_leave_request),
            operation!("updateLeaveStatus", Mutation, Roles(ADMIN), leave::update_leave_status),
            operation!("activityLogs", Query, Roles(ADMIN_OR_EMPLOYEE), activity::activity_logs),
            operation!("dashboardStats", Query, Roles(EMPLOYEE), dashboard::dashboard_stats),
        ];

        Self {
            operations: specs.into_iter().map(|spec| (spec.name, spec)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&OperationSpec> {
        self.operations.get(name)
    }

    pub fn specs(&self) -> impl Iterator<Item = &OperationSpec> {
        self.operations.values()
    }

    /// Authorizes, decodes and runs one named operation.
    ///
    /// Access is checked before arguments are decoded, so an unauthorized
    /// caller never learns whether their arguments were well formed.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        name: &str,
        args: Value,
    ) -> Result<Value, AppError> {
        let spec = self
            .get(name)
            .ok_or_else(|| AppError::not_found(format!("Unknown operation: {}", name)))?;

        if let Roles(declared) = spec.access {
            let target_id = args.get("id").and_then(Value::as_str);
            authorize(declared, ctx.principal(), target_id)?;
        }

        log::debug!("Executing {:?} {}", spec.kind, spec.name);
        (spec.dispatch)(ctx, args).await
    }
}

/// Public description of a registered operation.
#[derive(Debug, Serialize)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub kind: OperationKind,
    pub public: bool,
    pub roles: Vec<&'static str>,
}

impl From<&OperationSpec> for OperationDescriptor {
    fn from(spec: &OperationSpec) -> Self {
        let (public, roles) = match spec.access {
            Public => (true, Vec::new()),
            Roles(declared) => (false, declared.iter().map(RoleRequirement::label).collect()),
        };
        Self {
            name: spec.name,
            kind: spec.kind,
            public,
            roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_operation_is_registered_once() {
        let registry = OperationRegistry::new();
        let names: Vec<&str> = registry.specs().map(|s| s.name).collect();
        assert_eq!(names.len(), 14);
        assert!(registry.get("login").is_some());
        assert!(registry.get("dashboardStats").is_some());
        assert!(registry.get("bogus").is_none());
    }

    #[test]
    fn test_declared_access() {
        let registry = OperationRegistry::new();
        let access = |name: &str| registry.get(name).map(|s| s.access);

        assert_eq!(access("login"), Some(Public));
        assert_eq!(access("updateEmployee"), Some(Roles(OR_SELF)));
        assert_eq!(access("exportEmployees"), Some(Roles(ADMIN)));
        assert_eq!(access("activityLogs"), Some(Roles(ADMIN_OR_EMPLOYEE)));
    }

    #[test]
    fn test_null_arguments_decode_as_empty_object() {
        assert!(decode_input::<NoArguments>(Value::Null).is_ok());
    }
}
