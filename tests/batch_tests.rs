use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::json;

use staffdesk::database::models::Department;

mod common;

use common::{MockData, TestApp, TestAssertions};

#[actix_web::test]
async fn test_query_batch_keeps_order_and_aliases() {
    let app = TestApp::new();
    let (_, token) = app.admin_token().await;
    let (employee, user, _) = app.employee_account("member@example.com").await;

    let (status, body) = app
        .batch(
            Some(&token),
            json!([
                { "name": "employee", "alias": "profile", "arguments": { "id": employee.id } },
                { "name": "me" },
                { "name": "employee", "alias": "again", "arguments": { "id": employee.id } },
                { "name": "dashboardStats" },
            ]),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let results = TestAssertions::assert_success_response(&body);
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 4);

    assert_eq!(results[0]["alias"], json!("profile"));
    assert_eq!(results[0]["data"]["user"]["id"], json!(user.id));
    assert_eq!(results[1]["name"], json!("me"));
    assert_eq!(results[1]["data"]["role"], json!("ADMIN"));
    assert_eq!(results[2]["alias"], json!("again"));
    assert_eq!(results[2]["data"]["id"], json!(employee.id));
    assert_eq!(results[3]["data"]["totalEmployees"], json!(1));
    assert!(results.iter().all(|r| r["success"] == json!(true)));
}

#[actix_web::test]
async fn test_mutation_batch_runs_in_order() {
    let app = TestApp::new();
    let (_, token) = app.admin_token().await;

    let (status, body) = app
        .batch(
            Some(&token),
            json!([
                {
                    "name": "createEmployee",
                    "arguments": {
                        "input": {
                            "name": "Batch Hire",
                            "email": "batch@example.com",
                            "age": 31,
                            "department": "finance",
                            "position": "Accountant",
                            "joinDate": "2025-03-03",
                        }
                    }
                },
                { "name": "employees", "arguments": { "filter": { "search": "batch" } } },
            ]),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let results = TestAssertions::assert_success_response(&body);
    assert_eq!(results[0]["success"], json!(true));
    assert_eq!(results[1]["data"]["totalCount"], json!(1));
    assert_eq!(
        results[1]["data"]["edges"][0]["id"],
        results[0]["data"]["id"]
    );
}

#[actix_web::test]
async fn test_batch_entries_fail_independently() {
    let app = TestApp::new();
    let (_, _, token) = app.employee_account("partial@example.com").await;
    app.seed_employee(MockData::employee(Department::Hr, 44))
        .await;

    let (status, body) = app
        .batch(
            Some(&token),
            json!([
                { "name": "noSuchOperation" },
                { "name": "exportEmployees" },
                { "name": "employees" },
            ]),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let results = TestAssertions::assert_success_response(&body);
    assert_eq!(results[0]["success"], json!(false));
    assert_eq!(results[0]["code"], json!("NOT_FOUND"));
    assert_eq!(results[1]["code"], json!("FORBIDDEN"));
    assert_eq!(results[2]["success"], json!(true));
    assert_eq!(results[2]["data"]["totalCount"], json!(2));
}

#[actix_web::test]
async fn test_empty_batch_is_invalid() {
    let app = TestApp::new();

    let (status, body) = app.batch(None, json!([])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_error_code(&body, "INVALID_ARGUMENT");
}

#[actix_web::test]
async fn test_malformed_body_is_invalid() {
    let app = TestApp::new();

    let req = test::TestRequest::post()
        .uri("/api/v1/operations/login")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json");
    let (status, body) = app.call(req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_error_code(&body, "INVALID_ARGUMENT");
}

#[actix_web::test]
async fn test_list_operations() {
    let app = TestApp::new();

    let (status, body) = app
        .call(test::TestRequest::get().uri("/api/v1/operations"))
        .await;

    assert_eq!(status, StatusCode::OK);
    let operations = TestAssertions::assert_success_response(&body);
    let operations = operations.as_array().unwrap();
    assert_eq!(operations.len(), 14);

    let login = operations
        .iter()
        .find(|o| o["name"] == json!("login"))
        .unwrap();
    assert_eq!(login["kind"], json!("mutation"));
    assert_eq!(login["public"], json!(true));

    let update = operations
        .iter()
        .find(|o| o["name"] == json!("updateEmployee"))
        .unwrap();
    assert_eq!(update["roles"], json!(["orSelf"]));
}

#[actix_web::test]
async fn test_health() {
    let app = TestApp::new();

    let (status, body) = app.call(test::TestRequest::get().uri("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}
