use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;
use super::user::{UserInfo, UserRole};

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Department {
        Hr => "HR",
        Engineering => "ENGINEERING",
        Sales => "SALES",
        Marketing => "MARKETING",
        Finance => "FINANCE",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum EmployeeStatus {
        Active => "ACTIVE",
        OnLeave => "ON_LEAVE",
        Terminated => "TERMINATED",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub age: i32,
    pub department: Department,
    pub position: String,
    pub join_date: NaiveDate,
    pub salary: Option<f64>,
    pub status: EmployeeStatus,
    pub attendance: f64,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fully resolved values for a new employee row.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub age: i32,
    pub department: Department,
    pub position: String,
    pub join_date: NaiveDate,
    pub salary: Option<f64>,
    pub status: EmployeeStatus,
    pub attendance: f64,
    pub role: UserRole,
    pub avatar: Option<String>,
}

impl NewEmployee {
    pub fn into_employee(self) -> Employee {
        let now = Utc::now();
        Employee {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            age: self.age,
            department: self.department,
            position: self.position,
            join_date: self.join_date,
            salary: self.salary,
            status: self.status,
            attendance: self.attendance,
            role: self.role,
            avatar: self.avatar,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Column changes for a partial update; `None` leaves the column untouched.
/// Nullable columns take `Some(None)` to clear them.
#[derive(Debug, Clone, Default)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub age: Option<i32>,
    pub department: Option<Department>,
    pub position: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub salary: Option<Option<f64>>,
    pub status: Option<EmployeeStatus>,
    pub attendance: Option<f64>,
    pub role: Option<UserRole>,
    pub avatar: Option<Option<String>>,
}

impl EmployeePatch {
    pub fn apply(self, employee: &mut Employee) {
        if let Some(name) = self.name {
            employee.name = name;
        }
        if let Some(email) = self.email {
            employee.email = email;
        }
        if let Some(phone) = self.phone {
            employee.phone = phone;
        }
        if let Some(age) = self.age {
            employee.age = age;
        }
        if let Some(department) = self.department {
            employee.department = department;
        }
        if let Some(position) = self.position {
            employee.position = position;
        }
        if let Some(join_date) = self.join_date {
            employee.join_date = join_date;
        }
        if let Some(salary) = self.salary {
            employee.salary = salary;
        }
        if let Some(status) = self.status {
            employee.status = status;
        }
        if let Some(attendance) = self.attendance {
            employee.attendance = attendance;
        }
        if let Some(role) = self.role {
            employee.role = role;
        }
        if let Some(avatar) = self.avatar {
            employee.avatar = avatar;
        }
        employee.updated_at = Utc::now();
    }
}

/// Employee as returned to callers, with its linked login account resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeView {
    #[serde(flatten)]
    pub employee: Employee,
    pub user: Option<UserInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeConnection {
    pub edges: Vec<EmployeeView>,
    pub total_count: i64,
    pub has_next_page: bool,
}
