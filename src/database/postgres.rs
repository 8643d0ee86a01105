use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::database::{
    models::{
        ActivityLog, CreateActivityInput, DepartmentAggregate, Employee, EmployeePatch,
        LeaveRequest, LeaveStatus, LeaveStatusUpdate, NewEmployee, NewLeaveRequest, User,
    },
    query::{EmployeeFilter, EmployeeQuery},
    repositories::{
        ActivityRepository, EmployeeRepository, LeaveRequestRepository, UserRepository,
    },
    store::{Store, StoreResult},
};

/// PostgreSQL-backed store composed from the per-table repositories.
#[derive(Clone)]
pub struct PgStore {
    employees: EmployeeRepository,
    users: UserRepository,
    leave_requests: LeaveRequestRepository,
    activity: ActivityRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            employees: EmployeeRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            leave_requests: LeaveRequestRepository::new(pool.clone()),
            activity: ActivityRepository::new(pool),
        }
    }
}

fn key_by<T>(rows: Vec<T>, key: impl Fn(&T) -> Option<String>) -> HashMap<String, T> {
    rows.into_iter()
        .filter_map(|row| key(&row).map(|k| (k, row)))
        .collect()
}

#[async_trait]
impl Store for PgStore {
    async fn find_employee(&self, id: &str) -> StoreResult<Option<Employee>> {
        Ok(self.employees.find_by_id(id).await?)
    }

    async fn find_employees_by_ids(&self, ids: &[String]) -> StoreResult<HashMap<String, Employee>> {
        let rows = self.employees.find_by_ids(ids).await?;
        Ok(key_by(rows, |e| Some(e.id.clone())))
    }

    async fn list_employees(&self, query: &EmployeeQuery) -> StoreResult<Vec<Employee>> {
        Ok(self.employees.list(query).await?)
    }

    async fn count_employees(&self, filter: &EmployeeFilter) -> StoreResult<i64> {
        Ok(self.employees.count(filter).await?)
    }

    async fn export_employees(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.employees.get_all_newest_first().await?)
    }

    async fn create_employee(&self, input: NewEmployee) -> StoreResult<Employee> {
        Ok(self.employees.create(input).await?)
    }

    async fn update_employee(&self, id: &str, patch: EmployeePatch) -> StoreResult<Option<Employee>> {
        Ok(self.employees.update(id, patch).await?)
    }

    async fn delete_employee(&self, id: &str) -> StoreResult<bool> {
        Ok(self.employees.delete(id).await?)
    }

    async fn department_aggregates(&self) -> StoreResult<Vec<DepartmentAggregate>> {
        Ok(self.employees.department_aggregates().await?)
    }

    async fn create_user(&self, user: &User) -> StoreResult<User> {
        Ok(self.users.create_user(user).await?)
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.find_by_id(id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users.find_by_email(email).await?)
    }

    async fn find_users_by_ids(&self, ids: &[String]) -> StoreResult<HashMap<String, User>> {
        let rows = self.users.find_by_ids(ids).await?;
        Ok(key_by(rows, |u| Some(u.id.clone())))
    }

    async fn find_users_by_employee_ids(
        &self,
        employee_ids: &[String],
    ) -> StoreResult<HashMap<String, User>> {
        let rows = self.users.find_by_employee_ids(employee_ids).await?;
        Ok(key_by(rows, |u| u.employee_id.clone()))
    }

    async fn update_password(&self, user_id: &str, password_hash: &str) -> StoreResult<()> {
        Ok(self.users.update_password(user_id, password_hash).await?)
    }

    async fn create_leave_request(&self, input: NewLeaveRequest) -> StoreResult<LeaveRequest> {
        Ok(self.leave_requests.create_request(input).await?)
    }

    async fn list_leave_requests(&self, employee_id: Option<&str>) -> StoreResult<Vec<LeaveRequest>> {
        Ok(self.leave_requests.get_requests(employee_id).await?)
    }

    async fn decide_leave_request(&self, id: &str, status: LeaveStatus) -> StoreResult<LeaveStatusUpdate> {
        Ok(self.leave_requests.decide_request(id, status).await?)
    }

    async fn append_activity(&self, input: CreateActivityInput) -> StoreResult<ActivityLog> {
        Ok(self.activity.log_activity(input).await?)
    }

    async fn list_activity(&self) -> StoreResult<Vec<ActivityLog>> {
        Ok(self.activity.get_activities().await?)
    }
}
