//! Turns loosely-typed listing arguments into a validated [`EmployeeQuery`].

use serde::{Deserialize, Serialize};

use crate::database::models::{Department, EmployeeStatus};
use crate::database::query::{
    EmployeeFilter, EmployeeOrder, EmployeeQuery, PageWindow, SortDirection, SortField,
};
use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeFilterInput {
    pub department: Option<String>,
    pub status: Option<String>,
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortInput {
    pub field: String,
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationInput {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Unrecognized tokens are kept verbatim so the filter matches nothing.
fn canonical_or_raw(token: String, normalize: impl Fn(&str) -> Option<&'static str>) -> String {
    normalize(&token).map(str::to_string).unwrap_or(token)
}

pub fn shape_filter(input: Option<EmployeeFilterInput>) -> EmployeeFilter {
    let input = input.unwrap_or_default();
    EmployeeFilter {
        department: present(input.department).map(|token| {
            canonical_or_raw(token, |t| Department::normalize(t).map(|d| d.as_str()))
        }),
        status: present(input.status).map(|token| {
            canonical_or_raw(token, |t| EmployeeStatus::normalize(t).map(|s| s.as_str()))
        }),
        age_min: input.age_min,
        age_max: input.age_max,
        search: present(input.search),
    }
}

pub fn shape_order(input: Option<SortInput>) -> Result<EmployeeOrder, AppError> {
    let Some(input) = input else {
        return Ok(EmployeeOrder::default());
    };

    let field = SortField::from_field_name(input.field.trim()).ok_or_else(|| {
        AppError::invalid_argument(format!("Invalid sort field: {}", input.field))
    })?;

    let direction = match input.direction.as_deref().map(str::trim) {
        Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
        _ => SortDirection::Asc,
    };

    Ok(EmployeeOrder { field, direction })
}

pub fn shape_page(input: Option<PaginationInput>) -> PageWindow {
    let input = input.unwrap_or_default();
    PageWindow {
        cursor: present(input.cursor),
        limit: input
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE),
    }
}

pub fn shape_employee_query(
    filter: Option<EmployeeFilterInput>,
    sort: Option<SortInput>,
    pagination: Option<PaginationInput>,
) -> Result<EmployeeQuery, AppError> {
    Ok(EmployeeQuery {
        filter: shape_filter(filter),
        order: shape_order(sort)?,
        page: shape_page(pagination),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_enum_tokens_are_normalized() {
        let filter = shape_filter(Some(EmployeeFilterInput {
            department: Some("engineering".to_string()),
            status: Some(" on_leave ".to_string()),
            ..Default::default()
        }));
        assert_eq!(filter.department.as_deref(), Some("ENGINEERING"));
        assert_eq!(filter.status.as_deref(), Some("ON_LEAVE"));
    }

    #[test]
    fn test_unknown_tokens_pass_through() {
        let filter = shape_filter(Some(EmployeeFilterInput {
            department: Some("Legal".to_string()),
            ..Default::default()
        }));
        assert_eq!(filter.department.as_deref(), Some("Legal"));
    }

    #[test]
    fn test_blank_strings_are_absent() {
        let filter = shape_filter(Some(EmployeeFilterInput {
            department: Some("".to_string()),
            status: Some("   ".to_string()),
            search: Some("".to_string()),
            age_min: Some(30),
            age_max: None,
        }));
        assert_eq!(
            filter,
            EmployeeFilter {
                age_min: Some(30),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_unknown_sort_field_is_rejected() {
        let err = shape_order(Some(SortInput {
            field: "bogus".to_string(),
            direction: None,
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_sort_direction_defaults_to_ascending() {
        let order = shape_order(Some(SortInput {
            field: "joinDate".to_string(),
            direction: Some("sideways".to_string()),
        }))
        .unwrap();
        assert_eq!(order.field, SortField::JoinDate);
        assert_eq!(order.direction, SortDirection::Asc);

        let order = shape_order(Some(SortInput {
            field: "age".to_string(),
            direction: Some("DESC".to_string()),
        }))
        .unwrap();
        assert_eq!(order.direction, SortDirection::Desc);

        assert_eq!(shape_order(None).unwrap(), EmployeeOrder::default());
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(shape_page(None).limit, DEFAULT_PAGE_SIZE);
        let page = |limit| {
            shape_page(Some(PaginationInput {
                cursor: None,
                limit: Some(limit),
            }))
            .limit
        };
        assert_eq!(page(0), 1);
        assert_eq!(page(-5), 1);
        assert_eq!(page(500), MAX_PAGE_SIZE);
        assert_eq!(page(25), 25);
    }
}
