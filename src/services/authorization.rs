//! Role-based access decisions for named operations.

use crate::database::models::UserRole;
use crate::error::AppError;
use crate::services::token::Principal;

/// One entry of an operation's declared access list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    Role(UserRole),
    /// Caller may act on the record whose id equals their own.
    OrSelf,
}

impl RoleRequirement {
    pub fn label(&self) -> &'static str {
        match self {
            RoleRequirement::Role(role) => role.as_str(),
            RoleRequirement::OrSelf => "orSelf",
        }
    }
}

/// Decide whether `principal` may run an operation declaring `declared`.
///
/// Admins are allowed before the ownership rule is consulted, so an admin
/// never needs to own the target record.
pub fn authorize(
    declared: &[RoleRequirement],
    principal: Option<&Principal>,
    target_id: Option<&str>,
) -> Result<(), AppError> {
    let principal = principal.ok_or_else(|| AppError::unauthenticated("Not authenticated"))?;

    if declared.is_empty() || principal.role == UserRole::Admin {
        return Ok(());
    }

    if declared.contains(&RoleRequirement::OrSelf) {
        return if target_id == Some(principal.id.as_str()) {
            Ok(())
        } else {
            Err(AppError::forbidden("Not authorized to access this record"))
        };
    }

    if declared.contains(&RoleRequirement::Role(principal.role)) {
        Ok(())
    } else {
        Err(AppError::forbidden("Not authorized"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    const ADMIN_ONLY: &[RoleRequirement] = &[RoleRequirement::Role(UserRole::Admin)];
    const EMPLOYEE: &[RoleRequirement] = &[RoleRequirement::Role(UserRole::Employee)];
    const OR_SELF: &[RoleRequirement] = &[RoleRequirement::OrSelf];

    fn principal(id: &str, role: UserRole) -> Principal {
        Principal {
            id: id.to_string(),
            role,
        }
    }

    fn kind(result: Result<(), AppError>) -> Option<ErrorKind> {
        result.err().map(|e| e.kind())
    }

    #[test]
    fn test_anonymous_is_unauthenticated() {
        assert_eq!(
            kind(authorize(EMPLOYEE, None, None)),
            Some(ErrorKind::Unauthenticated)
        );
        assert_eq!(
            kind(authorize(&[], None, None)),
            Some(ErrorKind::Unauthenticated)
        );
    }

    #[test]
    fn test_empty_roles_allow_any_principal() {
        let employee = principal("u1", UserRole::Employee);
        assert!(authorize(&[], Some(&employee), None).is_ok());
    }

    #[test]
    fn test_wrong_role_is_forbidden() {
        let employee = principal("u1", UserRole::Employee);
        assert_eq!(
            kind(authorize(ADMIN_ONLY, Some(&employee), None)),
            Some(ErrorKind::Forbidden)
        );
    }

    #[test]
    fn test_admin_overrides_or_self_for_any_target() {
        let admin = principal("admin", UserRole::Admin);
        assert!(authorize(OR_SELF, Some(&admin), Some("someone-else")).is_ok());
        assert!(authorize(OR_SELF, Some(&admin), None).is_ok());
    }

    #[test]
    fn test_or_self_requires_matching_target() {
        let employee = principal("u1", UserRole::Employee);
        assert!(authorize(OR_SELF, Some(&employee), Some("u1")).is_ok());
        assert_eq!(
            kind(authorize(OR_SELF, Some(&employee), Some("u2"))),
            Some(ErrorKind::Forbidden)
        );
        assert_eq!(
            kind(authorize(OR_SELF, Some(&employee), None)),
            Some(ErrorKind::Forbidden)
        );
    }

    #[test]
    fn test_declared_role_allows() {
        let employee = principal("u1", UserRole::Employee);
        assert!(authorize(EMPLOYEE, Some(&employee), None).is_ok());
        let admin = principal("a1", UserRole::Admin);
        assert!(authorize(EMPLOYEE, Some(&admin), None).is_ok());
    }
}
