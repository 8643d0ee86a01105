use actix_web::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use staffdesk::database::Store;
use staffdesk::database::models::{Department, User, UserRole};

mod common;

use common::{MockData, TestApp, TestAssertions};

// Macro to generate unauthenticated access tests
macro_rules! test_unauthorized {
    ($test_name:ident, $operation:expr) => {
        test_unauthorized!($test_name, $operation, json!({}));
    };
    ($test_name:ident, $operation:expr, $json:expr) => {
        #[actix_web::test]
        async fn $test_name() {
            let app = TestApp::new();

            let (status, body) = app.operation($operation, None, $json).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED);
            TestAssertions::assert_error_code(&body, "UNAUTHENTICATED");
        }
    };
}

test_unauthorized!(test_me_unauthorized, "me");
test_unauthorized!(
    test_change_password_unauthorized,
    "changePassword",
    json!({ "currentPassword": "a", "newPassword": "b" })
);
test_unauthorized!(test_employee_unauthorized, "employee", json!({ "id": "x" }));
test_unauthorized!(test_employees_unauthorized, "employees");
test_unauthorized!(test_export_employees_unauthorized, "exportEmployees");
test_unauthorized!(test_create_employee_unauthorized, "createEmployee", json!({ "input": {} }));
test_unauthorized!(test_update_employee_unauthorized, "updateEmployee", json!({ "id": "x" }));
test_unauthorized!(test_delete_employee_unauthorized, "deleteEmployee", json!({ "id": "x" }));
test_unauthorized!(test_leave_requests_unauthorized, "leaveRequests");
test_unauthorized!(test_create_leave_unauthorized, "createLeaveRequest", json!({ "input": {} }));
test_unauthorized!(
    test_update_leave_status_unauthorized,
    "updateLeaveStatus",
    json!({ "id": "x", "status": "APPROVED" })
);
test_unauthorized!(test_activity_logs_unauthorized, "activityLogs");
test_unauthorized!(test_dashboard_stats_unauthorized, "dashboardStats");

#[actix_web::test]
async fn test_invalid_token_is_treated_as_anonymous() {
    let app = TestApp::new();

    let (status, body) = app.operation("me", Some("not.a.jwt"), json!({})).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    TestAssertions::assert_error_code(&body, "UNAUTHENTICATED");
}

#[actix_web::test]
async fn test_employee_is_forbidden_from_admin_operations() {
    let app = TestApp::new();
    let (_, _, token) = app.employee_account("worker@example.com").await;

    for (operation, args) in [
        ("exportEmployees", json!({})),
        ("deleteEmployee", json!({ "id": "x" })),
        ("updateLeaveStatus", json!({ "id": "x", "status": "APPROVED" })),
        ("createEmployee", json!({ "input": {} })),
    ] {
        let (status, body) = app.operation(operation, Some(&token), args).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", operation);
        TestAssertions::assert_error_code(&body, "FORBIDDEN");
    }
}

#[actix_web::test]
async fn test_authorization_precedes_argument_validation() {
    let app = TestApp::new();
    let (_, _, token) = app.employee_account("worker@example.com").await;

    // Malformed arguments, but the caller lacks the role: forbidden, not invalid
    let (status, _) = app
        .operation("createEmployee", Some(&token), json!({ "input": "garbage" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_admin_may_update_any_employee() {
    let app = TestApp::new();
    let (_, token) = app.admin_token().await;
    let employee = app
        .seed_employee(MockData::named("Ada", Department::Finance, 36))
        .await;

    let data = app
        .ok(
            "updateEmployee",
            Some(&token),
            json!({ "id": employee.id, "input": { "position": "Controller" } }),
        )
        .await;

    assert_eq!(data["position"], json!("Controller"));
}

#[actix_web::test]
async fn test_employee_may_update_only_own_record() {
    let app = TestApp::new();
    let own = app
        .seed_employee(MockData::named("Self", Department::Sales, 28))
        .await;
    let other = app
        .seed_employee(MockData::named("Other", Department::Sales, 41))
        .await;

    // Account whose id matches the employee record it edits
    let mut user = User::new(
        "self@example.com".to_string(),
        "unused".to_string(),
        UserRole::Employee,
        None,
    );
    user.id = own.id.clone();
    app.store.create_user(&user).await.unwrap();
    let token = common::AuthHelper::create_test_token(&user, &app.config);

    let data = app
        .ok(
            "updateEmployee",
            Some(&token),
            json!({ "id": own.id, "input": { "phone": "555-0100" } }),
        )
        .await;
    assert_eq!(data["phone"], json!("555-0100"));

    let (status, body) = app
        .operation(
            "updateEmployee",
            Some(&token),
            json!({ "id": other.id, "input": { "phone": "555-0199" } }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    TestAssertions::assert_error_code(&body, "FORBIDDEN");
}

#[actix_web::test]
async fn test_login_is_public() {
    let app = TestApp::new();

    let (status, body) = app
        .operation(
            "login",
            None,
            json!({ "email": "nobody@example.com", "password": "x" }),
        )
        .await;

    // Reaches the handler: rejected for credentials, not for missing auth
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Invalid credentials"));
}

#[actix_web::test]
async fn test_unknown_operation_is_not_found() {
    let app = TestApp::new();
    let (_, token) = app.admin_token().await;

    let (status, body) = app.operation("fireEveryone", Some(&token), json!({})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    TestAssertions::assert_error_code(&body, "NOT_FOUND");
}
