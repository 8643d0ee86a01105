use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

use crate::database::models::{
    ActionType, Department, EmployeeConnection, EmployeePatch, EmployeeStatus, EmployeeView,
    NewEmployee, UserRole,
};
use crate::error::AppError;
use crate::handlers::registry::{NoArguments, OperationInput};
use crate::services::RequestContext;
use crate::services::query_shaper::{
    EmployeeFilterInput, PaginationInput, SortInput, shape_employee_query,
};

/// Calendar date accepted either as `YYYY-MM-DD` or as an RFC 3339 timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateArg(pub NaiveDate);

impl<'de> Deserialize<'de> for DateArg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(DateArg(date));
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| DateArg(dt.date_naive()))
            .map_err(|_| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Keeps an explicit `null` apart from an absent field.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `null` clears the column; blank text leaves it as it was.
fn clearable(value: Option<Option<String>>) -> Option<Option<String>> {
    match value {
        Some(None) => Some(None),
        Some(text) => present(text).map(Some),
        None => None,
    }
}

fn parse_token<T>(field: &str, token: &str) -> Result<T, AppError>
where
    T: std::str::FromStr<Err = String>,
{
    token
        .parse()
        .map_err(|e| AppError::invalid_argument(format!("{}: {}", field, e)))
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_argument(format!("{} is required", field)));
    }
    Ok(())
}

fn check_email(value: &str) -> Result<(), AppError> {
    if !value.contains('@') {
        return Err(AppError::invalid_argument("email must be a valid address"));
    }
    Ok(())
}

fn check_age(age: i32) -> Result<(), AppError> {
    if age < 0 {
        return Err(AppError::invalid_argument("age must not be negative"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct IdArgs {
    pub id: String,
}

impl OperationInput for IdArgs {
    fn validate(&self) -> Result<(), AppError> {
        require_text("id", &self.id)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EmployeesArgs {
    pub filter: Option<EmployeeFilterInput>,
    pub sort: Option<SortInput>,
    pub pagination: Option<PaginationInput>,
}

impl OperationInput for EmployeesArgs {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub age: i32,
    pub department: String,
    pub position: String,
    pub join_date: DateArg,
    pub salary: Option<f64>,
    pub status: Option<String>,
    pub attendance: Option<f64>,
    pub role: Option<String>,
    pub avatar: Option<String>,
}

impl CreateEmployeeInput {
    /// Resolves enum tokens and defaults. Unknown tokens are rejected.
    fn into_new_employee(self) -> Result<NewEmployee, AppError> {
        Ok(NewEmployee {
            department: parse_token::<Department>("department", &self.department)?,
            status: match present(self.status) {
                Some(token) => parse_token::<EmployeeStatus>("status", &token)?,
                None => EmployeeStatus::Active,
            },
            role: match present(self.role) {
                Some(token) => parse_token::<UserRole>("role", &token)?,
                None => UserRole::Employee,
            },
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: present(self.phone),
            age: self.age,
            position: self.position.trim().to_string(),
            join_date: self.join_date.0,
            salary: self.salary,
            attendance: self.attendance.unwrap_or(0.0),
            avatar: present(self.avatar),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeArgs {
    pub input: CreateEmployeeInput,
}

impl OperationInput for CreateEmployeeArgs {
    fn validate(&self) -> Result<(), AppError> {
        let input = &self.input;
        require_text("name", &input.name)?;
        require_text("email", &input.email)?;
        check_email(&input.email)?;
        require_text("department", &input.department)?;
        require_text("position", &input.position)?;
        check_age(input.age)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeInput {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    pub age: Option<i32>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub join_date: Option<DateArg>,
    #[serde(default, deserialize_with = "nullable")]
    pub salary: Option<Option<f64>>,
    pub status: Option<String>,
    pub attendance: Option<f64>,
    pub role: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar: Option<Option<String>>,
}

impl UpdateEmployeeInput {
    fn into_patch(self) -> Result<EmployeePatch, AppError> {
        Ok(EmployeePatch {
            department: present(self.department)
                .map(|token| parse_token::<Department>("department", &token))
                .transpose()?,
            status: present(self.status)
                .map(|token| parse_token::<EmployeeStatus>("status", &token))
                .transpose()?,
            role: present(self.role)
                .map(|token| parse_token::<UserRole>("role", &token))
                .transpose()?,
            name: present(self.name).map(|v| v.trim().to_string()),
            email: present(self.email).map(|v| v.trim().to_string()),
            phone: clearable(self.phone),
            age: self.age,
            position: present(self.position).map(|v| v.trim().to_string()),
            join_date: self.join_date.map(|d| d.0),
            salary: self.salary,
            attendance: self.attendance,
            avatar: clearable(self.avatar),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeArgs {
    pub id: String,
    #[serde(default)]
    pub input: UpdateEmployeeInput,
}

impl OperationInput for UpdateEmployeeArgs {
    fn validate(&self) -> Result<(), AppError> {
        require_text("id", &self.id)?;
        if let Some(email) = &self.input.email {
            check_email(email)?;
        }
        if let Some(age) = self.input.age {
            check_age(age)?;
        }
        Ok(())
    }
}

pub async fn employee(ctx: &RequestContext, args: IdArgs) -> Result<Option<EmployeeView>, AppError> {
    match ctx.employees.load(&args.id).await? {
        Some(employee) => Ok(Some(ctx.employee_view(employee).await?)),
        None => Ok(None),
    }
}

pub async fn employees(
    ctx: &RequestContext,
    args: EmployeesArgs,
) -> Result<EmployeeConnection, AppError> {
    let query = shape_employee_query(args.filter, args.sort, args.pagination)?;

    let page = ctx.store().list_employees(&query).await?;
    let total_count = ctx.store().count_employees(&query.filter).await?;
    // Approximation: a full page is assumed to have a successor.
    let has_next_page = page.len() as i64 == query.page.limit;

    Ok(EmployeeConnection {
        edges: ctx.employee_views(page).await?,
        total_count,
        has_next_page,
    })
}

pub async fn export_employees(
    ctx: &RequestContext,
    _args: NoArguments,
) -> Result<Vec<EmployeeView>, AppError> {
    let employees = ctx.store().export_employees().await?;
    log::info!("Exporting {} employees", employees.len());
    ctx.employee_views(employees).await
}

pub async fn create_employee(
    ctx: &RequestContext,
    args: CreateEmployeeArgs,
) -> Result<EmployeeView, AppError> {
    let employee = ctx
        .store()
        .create_employee(args.input.into_new_employee()?)
        .await?;
    log::info!("Created employee {}", employee.id);

    ctx.services
        .activity
        .log_employee_activity(ActionType::Create, &employee, ctx.principal())
        .await;

    ctx.employee_view(employee).await
}

pub async fn update_employee(
    ctx: &RequestContext,
    args: UpdateEmployeeArgs,
) -> Result<EmployeeView, AppError> {
    let patch = args.input.into_patch()?;
    let employee = ctx
        .store()
        .update_employee(&args.id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("Employee not found"))?;
    log::info!("Updated employee {}", employee.id);

    ctx.services
        .activity
        .log_employee_activity(ActionType::Update, &employee, ctx.principal())
        .await;

    ctx.employee_view(employee).await
}

pub async fn delete_employee(ctx: &RequestContext, args: IdArgs) -> Result<bool, AppError> {
    let Some(employee) = ctx.store().find_employee(&args.id).await? else {
        return Ok(false);
    };
    if !ctx.store().delete_employee(&employee.id).await? {
        return Ok(false);
    }
    log::info!("Deleted employee {}", employee.id);

    ctx.services
        .activity
        .log_employee_activity(ActionType::Delete, &employee, ctx.principal())
        .await;

    Ok(true)
}
