use std::sync::Arc;

use crate::config::Config;
use crate::database::Store;
use crate::database::models::{Employee, EmployeeView, User};
use crate::error::AppError;
use crate::services::activity_logger::ActivityLogger;
use crate::services::auth::AuthService;
use crate::services::loader::{
    BatchLoader, EmployeeLoader, EmployeeUserLoader, EmployeesById, UserLoader, UsersByEmployeeId,
    UsersById,
};
use crate::services::token::{Principal, TokenService};

/// Long-lived collaborators shared by every request.
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn Store>,
    pub auth: AuthService,
    pub activity: ActivityLogger,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        Self {
            auth: AuthService::new(
                store.clone(),
                TokenService::from_config(config),
                config.bcrypt_cost,
            ),
            activity: ActivityLogger::new(store.clone()),
            store,
        }
    }
}

/// Everything a handler may touch while resolving one request.
///
/// Built fresh per request; its loaders cache only for that request.
pub struct RequestContext {
    pub principal: Option<Principal>,
    pub services: AppServices,
    pub employees: EmployeeLoader,
    pub users: UserLoader,
    pub employee_users: EmployeeUserLoader,
}

impl RequestContext {
    pub fn new(services: AppServices, principal: Option<Principal>) -> Self {
        let store = services.store.clone();
        Self {
            principal,
            employees: BatchLoader::new(EmployeesById(store.clone())),
            users: BatchLoader::new(UsersById(store.clone())),
            employee_users: BatchLoader::new(UsersByEmployeeId(store)),
            services,
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.services.store.as_ref()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn require_principal(&self) -> Result<&Principal, AppError> {
        self.principal
            .as_ref()
            .ok_or_else(|| AppError::unauthenticated("Not authenticated"))
    }

    /// The user record behind the principal.
    pub async fn current_user(&self) -> Result<User, AppError> {
        let principal = self.require_principal()?;
        self.users
            .load(&principal.id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Id of the employee profile linked to the principal's account.
    pub async fn linked_employee_id(&self) -> Result<String, AppError> {
        self.current_user()
            .await?
            .employee_id
            .ok_or_else(|| AppError::not_found("Employee profile not found"))
    }

    /// Attaches each employee's login account via one batched lookup.
    pub async fn employee_views(&self, employees: Vec<Employee>) -> Result<Vec<EmployeeView>, AppError> {
        let ids: Vec<String> = employees.iter().map(|e| e.id.clone()).collect();
        let users = self.employee_users.load_many(&ids).await?;
        Ok(employees
            .into_iter()
            .zip(users)
            .map(|(employee, user)| EmployeeView {
                employee,
                user: user.map(Into::into),
            })
            .collect())
    }

    pub async fn employee_view(&self, employee: Employee) -> Result<EmployeeView, AppError> {
        let user = self.employee_users.load(&employee.id).await?;
        Ok(EmployeeView {
            employee,
            user: user.map(Into::into),
        })
    }
}
