use async_trait::async_trait;
use std::collections::HashMap;

use crate::database::models::{
    ActivityLog, CreateActivityInput, DepartmentAggregate, Employee, EmployeePatch,
    LeaveRequest, LeaveStatus, LeaveStatusUpdate, NewEmployee, NewLeaveRequest, User,
};
use crate::database::query::{EmployeeFilter, EmployeeQuery};
use crate::error::AppError;

pub type StoreResult<T> = Result<T, AppError>;

/// Persistence collaborator for the four entities.
///
/// Every method is a single atomic statement; callers never get a
/// multi-statement transaction. Uniqueness violations surface as
/// `AppError::Conflict`.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    // Employees

    async fn find_employee(&self, id: &str) -> StoreResult<Option<Employee>>;

    /// Batched read keyed by id. Unknown ids are simply absent from the map.
    async fn find_employees_by_ids(&self, ids: &[String]) -> StoreResult<HashMap<String, Employee>>;

    /// One cursor window of a filtered, ordered listing.
    async fn list_employees(&self, query: &EmployeeQuery) -> StoreResult<Vec<Employee>>;

    async fn count_employees(&self, filter: &EmployeeFilter) -> StoreResult<i64>;

    /// Every employee, newest first.
    async fn export_employees(&self) -> StoreResult<Vec<Employee>>;

    async fn create_employee(&self, input: NewEmployee) -> StoreResult<Employee>;

    /// Returns `None` when no employee has this id.
    async fn update_employee(&self, id: &str, patch: EmployeePatch) -> StoreResult<Option<Employee>>;

    /// Returns `false` when no employee has this id.
    async fn delete_employee(&self, id: &str) -> StoreResult<bool>;

    /// Headcount and mean salary per department that has employees.
    async fn department_aggregates(&self) -> StoreResult<Vec<DepartmentAggregate>>;

    // Users

    async fn create_user(&self, user: &User) -> StoreResult<User>;

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_users_by_ids(&self, ids: &[String]) -> StoreResult<HashMap<String, User>>;

    /// Batched read keyed by the linked employee id.
    async fn find_users_by_employee_ids(&self, employee_ids: &[String]) -> StoreResult<HashMap<String, User>>;

    async fn update_password(&self, user_id: &str, password_hash: &str) -> StoreResult<()>;

    // Leave requests

    async fn create_leave_request(&self, input: NewLeaveRequest) -> StoreResult<LeaveRequest>;

    /// Newest first; scoped to one employee when `employee_id` is given.
    async fn list_leave_requests(&self, employee_id: Option<&str>) -> StoreResult<Vec<LeaveRequest>>;

    /// Moves a PENDING request to `status`; decided requests are left untouched.
    async fn decide_leave_request(&self, id: &str, status: LeaveStatus) -> StoreResult<LeaveStatusUpdate>;

    // Activity log

    async fn append_activity(&self, input: CreateActivityInput) -> StoreResult<ActivityLog>;

    /// Newest first.
    async fn list_activity(&self) -> StoreResult<Vec<ActivityLog>>;
}
