//! Store-ready query descriptions for employee listings.
//!
//! Values here are already validated: sort fields come from a closed set and
//! limits are clamped. Backends translate them without further checks.

use std::cmp::Ordering;

use crate::database::models::Employee;

/// Predicate set for employee listings and counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeFilter {
    /// Canonical department value, or the caller's raw token when unrecognized.
    pub department: Option<String>,
    /// Canonical status value, or the caller's raw token when unrecognized.
    pub status: Option<String>,
    /// Inclusive lower age bound.
    pub age_min: Option<i32>,
    /// Inclusive upper age bound.
    pub age_max: Option<i32>,
    /// Case-insensitive substring matched against name OR email.
    pub search: Option<String>,
}

impl EmployeeFilter {
    pub fn matches(&self, employee: &Employee) -> bool {
        if let Some(department) = &self.department {
            if employee.department.as_str() != department {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if employee.status.as_str() != status {
                return false;
            }
        }
        if let Some(min) = self.age_min {
            if employee.age < min {
                return false;
            }
        }
        if let Some(max) = self.age_max {
            if employee.age > max {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_name = employee.name.to_lowercase().contains(&needle);
            let in_email = employee.email.to_lowercase().contains(&needle);
            if !in_name && !in_email {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Email,
    Age,
    Department,
    Position,
    JoinDate,
    Salary,
    Status,
    Attendance,
    Role,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub const ALL: &'static [SortField] = &[
        SortField::Id,
        SortField::Name,
        SortField::Email,
        SortField::Age,
        SortField::Department,
        SortField::Position,
        SortField::JoinDate,
        SortField::Salary,
        SortField::Status,
        SortField::Attendance,
        SortField::Role,
        SortField::CreatedAt,
        SortField::UpdatedAt,
    ];

    /// Name accepted from callers.
    pub fn field_name(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Age => "age",
            SortField::Department => "department",
            SortField::Position => "position",
            SortField::JoinDate => "joinDate",
            SortField::Salary => "salary",
            SortField::Status => "status",
            SortField::Attendance => "attendance",
            SortField::Role => "role",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }

    /// Backing column in the relational schema.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Age => "age",
            SortField::Department => "department",
            SortField::Position => "position",
            SortField::JoinDate => "join_date",
            SortField::Salary => "salary",
            SortField::Status => "status",
            SortField::Attendance => "attendance",
            SortField::Role => "role",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    /// ORDER BY expression for the column. Text columns compare byte-wise,
    /// the same order [`SortField::compare`] uses, whatever the database locale.
    pub fn order_expression(&self) -> String {
        match self {
            SortField::Id
            | SortField::Name
            | SortField::Email
            | SortField::Department
            | SortField::Position
            | SortField::Status
            | SortField::Role => format!("{} COLLATE \"C\"", self.column()),
            _ => self.column().to_string(),
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.field_name() == name)
    }

    /// Ascending comparison of two employees on this field.
    /// Missing salaries sort after present ones, as in SQL `NULLS LAST`.
    pub fn compare(&self, a: &Employee, b: &Employee) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Name => a.name.cmp(&b.name),
            SortField::Email => a.email.cmp(&b.email),
            SortField::Age => a.age.cmp(&b.age),
            SortField::Department => a.department.as_str().cmp(b.department.as_str()),
            SortField::Position => a.position.cmp(&b.position),
            SortField::JoinDate => a.join_date.cmp(&b.join_date),
            SortField::Salary => match (a.salary, b.salary) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::Attendance => a.attendance.total_cmp(&b.attendance),
            SortField::Role => a.role.as_str().cmp(b.role.as_str()),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeeOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for EmployeeOrder {
    fn default() -> Self {
        Self {
            field: SortField::Name,
            direction: SortDirection::Asc,
        }
    }
}

impl EmployeeOrder {
    /// Total order used for paging: the requested field, then `id` ascending.
    pub fn compare(&self, a: &Employee, b: &Employee) -> Ordering {
        let primary = match self.direction {
            SortDirection::Asc => self.field.compare(a, b),
            SortDirection::Desc => self.field.compare(a, b).reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Cursor window: records strictly after `cursor`, at most `limit` of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub cursor: Option<String>,
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeQuery {
    pub filter: EmployeeFilter,
    pub order: EmployeeOrder,
    pub page: PageWindow,
}
