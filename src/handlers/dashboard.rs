use crate::database::models::{
    DashboardStats, DepartmentAggregate, DepartmentDistribution, SalaryByDepartment,
};
use crate::error::AppError;
use crate::handlers::registry::NoArguments;
use crate::services::RequestContext;

// Not backed by data yet; reported as fixed values.
const ATTENDANCE_RATE_PLACEHOLDER: f64 = 95.4;
const PENDING_REQUESTS_PLACEHOLDER: i64 = 23;

pub async fn dashboard_stats(
    ctx: &RequestContext,
    _args: NoArguments,
) -> Result<DashboardStats, AppError> {
    let total_employees = ctx.store().count_employees(&Default::default()).await?;
    let aggregates = ctx.store().department_aggregates().await?;
    Ok(build_stats(total_employees, aggregates))
}

fn build_stats(total_employees: i64, aggregates: Vec<DepartmentAggregate>) -> DashboardStats {
    let department_distribution = aggregates
        .iter()
        .map(|a| DepartmentDistribution {
            department: a.department,
            count: a.count,
        })
        .collect();

    let salary_by_department = aggregates
        .iter()
        .map(|a| SalaryByDepartment {
            department: a.department,
            average_salary: a.average_salary.map_or(0, |avg| avg.round() as i64),
        })
        .collect();

    DashboardStats {
        total_employees,
        active_departments: aggregates.len() as i64,
        attendance_rate: ATTENDANCE_RATE_PLACEHOLDER,
        pending_requests: PENDING_REQUESTS_PLACEHOLDER,
        department_distribution,
        salary_by_department,
    }
}
