//! In-memory store for tests and `STORAGE=memory` development runs.
//!
//! Mirrors the PostgreSQL schema's constraints: unique emails, a unique
//! user-to-employee link, `ON DELETE SET NULL` for that link and cascading
//! deletes of leave requests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::database::{
    models::{
        ActivityLog, CreateActivityInput, DepartmentAggregate, Department, Employee,
        EmployeePatch, LeaveRequest, LeaveStatus, LeaveStatusUpdate, NewEmployee,
        NewLeaveRequest, User,
    },
    query::{EmployeeFilter, EmployeeQuery},
    store::{Store, StoreResult},
};
use crate::error::AppError;

#[derive(Debug, Default)]
struct Tables {
    // Vectors keep insertion order so newest-first listings are stable.
    employees: Vec<Employee>,
    users: Vec<User>,
    leave_requests: Vec<LeaveRequest>,
    activity: Vec<ActivityLog>,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

fn conflict(what: &str) -> AppError {
    AppError::Conflict(format!("{} already exists", what))
}

/// Newest first; among equal timestamps the later insert comes first.
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    out
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_employee(&self, id: &str) -> StoreResult<Option<Employee>> {
        let tables = self.tables.read().await;
        Ok(tables.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find_employees_by_ids(&self, ids: &[String]) -> StoreResult<HashMap<String, Employee>> {
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .iter()
            .filter(|e| ids.contains(&e.id))
            .map(|e| (e.id.clone(), e.clone()))
            .collect())
    }

    async fn list_employees(&self, query: &EmployeeQuery) -> StoreResult<Vec<Employee>> {
        let tables = self.tables.read().await;
        let mut ordered: Vec<&Employee> = tables
            .employees
            .iter()
            .filter(|e| query.filter.matches(e))
            .collect();
        ordered.sort_by(|a, b| query.order.compare(a, b));

        let start = match &query.page.cursor {
            Some(cursor) => match ordered.iter().position(|e| &e.id == cursor) {
                Some(index) => index + 1,
                None => return Ok(Vec::new()),
            },
            None => 0,
        };

        let limit = usize::try_from(query.page.limit.max(0)).unwrap_or(0);
        Ok(ordered
            .into_iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_employees(&self, filter: &EmployeeFilter) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.employees.iter().filter(|e| filter.matches(e)).count() as i64)
    }

    async fn export_employees(&self) -> StoreResult<Vec<Employee>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.employees, |e| e.created_at))
    }

    async fn create_employee(&self, input: NewEmployee) -> StoreResult<Employee> {
        let mut tables = self.tables.write().await;
        if tables.employees.iter().any(|e| e.email == input.email) {
            return Err(conflict("Employee with this email"));
        }
        let employee = input.into_employee();
        tables.employees.push(employee.clone());
        Ok(employee)
    }

    async fn update_employee(&self, id: &str, patch: EmployeePatch) -> StoreResult<Option<Employee>> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &patch.email {
            if tables.employees.iter().any(|e| &e.email == email && e.id != id) {
                return Err(conflict("Employee with this email"));
            }
        }
        match tables.employees.iter_mut().find(|e| e.id == id) {
            Some(employee) => {
                patch.apply(employee);
                Ok(Some(employee.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_employee(&self, id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.employees.len();
        tables.employees.retain(|e| e.id != id);
        if tables.employees.len() == before {
            return Ok(false);
        }
        for user in tables.users.iter_mut() {
            if user.employee_id.as_deref() == Some(id) {
                user.employee_id = None;
            }
        }
        tables.leave_requests.retain(|r| r.employee_id != id);
        Ok(true)
    }

    async fn department_aggregates(&self) -> StoreResult<Vec<DepartmentAggregate>> {
        let tables = self.tables.read().await;
        let mut groups: HashMap<Department, (i64, f64, i64)> = HashMap::new();
        for employee in &tables.employees {
            let entry = groups.entry(employee.department).or_insert((0, 0.0, 0));
            entry.0 += 1;
            if let Some(salary) = employee.salary {
                entry.1 += salary;
                entry.2 += 1;
            }
        }

        let mut aggregates: Vec<DepartmentAggregate> = groups
            .into_iter()
            .map(|(department, (count, salary_sum, salaried))| DepartmentAggregate {
                department,
                count,
                average_salary: (salaried > 0).then(|| salary_sum / salaried as f64),
            })
            .collect();
        aggregates.sort_by(|a, b| a.department.as_str().cmp(b.department.as_str()));
        Ok(aggregates)
    }

    async fn create_user(&self, user: &User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(conflict("User with this email"));
        }
        if let Some(employee_id) = &user.employee_id {
            if tables
                .users
                .iter()
                .any(|u| u.employee_id.as_ref() == Some(employee_id))
            {
                return Err(conflict("User for this employee"));
            }
            if !tables.employees.iter().any(|e| &e.id == employee_id) {
                return Err(AppError::invalid_argument("Linked employee does not exist"));
            }
        }
        tables.users.push(user.clone());
        Ok(user.clone())
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_users_by_ids(&self, ids: &[String]) -> StoreResult<HashMap<String, User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .map(|u| (u.id.clone(), u.clone()))
            .collect())
    }

    async fn find_users_by_employee_ids(
        &self,
        employee_ids: &[String],
    ) -> StoreResult<HashMap<String, User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter_map(|u| {
                u.employee_id
                    .as_ref()
                    .filter(|id| employee_ids.contains(id))
                    .map(|id| (id.clone(), u.clone()))
            })
            .collect())
    }

    async fn update_password(&self, user_id: &str, password_hash: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn create_leave_request(&self, input: NewLeaveRequest) -> StoreResult<LeaveRequest> {
        let mut tables = self.tables.write().await;
        if !tables.employees.iter().any(|e| e.id == input.employee_id) {
            return Err(AppError::invalid_argument("Employee does not exist"));
        }
        let request = input.into_leave_request();
        tables.leave_requests.push(request.clone());
        Ok(request)
    }

    async fn list_leave_requests(&self, employee_id: Option<&str>) -> StoreResult<Vec<LeaveRequest>> {
        let tables = self.tables.read().await;
        let scoped: Vec<LeaveRequest> = tables
            .leave_requests
            .iter()
            .filter(|r| employee_id.is_none_or(|id| r.employee_id == id))
            .cloned()
            .collect();
        Ok(newest_first(&scoped, |r| r.created_at))
    }

    async fn decide_leave_request(&self, id: &str, status: LeaveStatus) -> StoreResult<LeaveStatusUpdate> {
        let mut tables = self.tables.write().await;
        Ok(match tables.leave_requests.iter_mut().find(|r| r.id == id) {
            Some(request) if request.status == LeaveStatus::Pending => {
                request.status = status;
                LeaveStatusUpdate::Updated(request.clone())
            }
            Some(request) => LeaveStatusUpdate::AlreadyDecided(request.clone()),
            None => LeaveStatusUpdate::NotFound,
        })
    }

    async fn append_activity(&self, input: CreateActivityInput) -> StoreResult<ActivityLog> {
        let mut tables = self.tables.write().await;
        let entry = input.into_activity_log();
        tables.activity.push(entry.clone());
        Ok(entry)
    }

    async fn list_activity(&self) -> StoreResult<Vec<ActivityLog>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.activity, |a| a.created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{EmployeeStatus, UserRole};
    use crate::database::query::{EmployeeOrder, PageWindow, SortDirection, SortField};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn new_employee(name: &str, age: i32, department: Department) -> NewEmployee {
        NewEmployee {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            age,
            department,
            position: "Engineer".to_string(),
            join_date: NaiveDate::from_ymd_opt(2022, 1, 10).unwrap(),
            salary: Some(50_000.0),
            status: EmployeeStatus::Active,
            attendance: 90.0,
            role: UserRole::Employee,
            avatar: None,
        }
    }

    fn query(cursor: Option<String>, limit: i64) -> EmployeeQuery {
        EmployeeQuery {
            filter: EmployeeFilter::default(),
            order: EmployeeOrder {
                field: SortField::Age,
                direction: SortDirection::Asc,
            },
            page: PageWindow { cursor, limit },
        }
    }

    #[tokio::test]
    async fn test_cursor_window_skips_past_cursor() {
        let store = MemoryStore::new();
        for (name, age) in [("Ann", 30), ("Bob", 20), ("Cid", 40)] {
            store
                .create_employee(new_employee(name, age, Department::Sales))
                .await
                .unwrap();
        }

        let first = store.list_employees(&query(None, 2)).await.unwrap();
        let names: Vec<&str> = first.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Ann"]);

        let second = store
            .list_employees(&query(Some(first[1].id.clone()), 2))
            .await
            .unwrap();
        let names: Vec<&str> = second.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Cid"]);
    }

    #[tokio::test]
    async fn test_unknown_cursor_yields_empty_page() {
        let store = MemoryStore::new();
        store
            .create_employee(new_employee("Ann", 30, Department::Hr))
            .await
            .unwrap();

        let page = store
            .list_employees(&query(Some("missing".to_string()), 10))
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_employee_email_conflicts() {
        let store = MemoryStore::new();
        store
            .create_employee(new_employee("Ann", 30, Department::Hr))
            .await
            .unwrap();
        let err = store
            .create_employee(new_employee("Ann", 31, Department::Sales))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_unlinks_user_and_drops_leave_requests() {
        let store = MemoryStore::new();
        let employee = store
            .create_employee(new_employee("Ann", 30, Department::Hr))
            .await
            .unwrap();
        let user = User::new(
            "ann@example.com".to_string(),
            "hash".to_string(),
            UserRole::Employee,
            Some(employee.id.clone()),
        );
        store.create_user(&user).await.unwrap();
        store
            .create_leave_request(NewLeaveRequest {
                start_date: chrono::Utc::now(),
                end_date: chrono::Utc::now(),
                reason: "Trip".to_string(),
                employee_id: employee.id.clone(),
            })
            .await
            .unwrap();

        assert!(store.delete_employee(&employee.id).await.unwrap());
        assert!(!store.delete_employee(&employee.id).await.unwrap());

        let user = store.find_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(user.employee_id, None);
        assert!(store.list_leave_requests(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_department_aggregates_ignore_missing_salaries() {
        let store = MemoryStore::new();
        let mut unpaid = new_employee("Ann", 30, Department::Hr);
        unpaid.salary = None;
        store.create_employee(unpaid).await.unwrap();
        store
            .create_employee(new_employee("Bob", 30, Department::Hr))
            .await
            .unwrap();

        let aggregates = store.department_aggregates().await.unwrap();
        assert_eq!(
            aggregates,
            vec![DepartmentAggregate {
                department: Department::Hr,
                count: 2,
                average_salary: Some(50_000.0),
            }]
        );
    }
}
