use serde::{Deserialize, Serialize};

use super::employee::Department;

/// One row of the per-department grouped aggregate.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DepartmentAggregate {
    pub department: Department,
    pub count: i64,
    pub average_salary: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentDistribution {
    pub department: Department,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryByDepartment {
    pub department: Department,
    pub average_salary: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_employees: i64,
    pub active_departments: i64,
    pub attendance_rate: f64,
    pub pending_requests: i64,
    pub department_distribution: Vec<DepartmentDistribution>,
    pub salary_by_department: Vec<SalaryByDepartment>,
}
