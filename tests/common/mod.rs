#![allow(dead_code)]

use actix_web::http::{StatusCode, header::HeaderMap};
use actix_web::{App, test, web};
use chrono::NaiveDate;
use fake::Fake;
use fake::faker::name::en::Name;
use serde_json::{Value, json};
use std::env;
use std::sync::Arc;

use staffdesk::config::Config;
use staffdesk::database::models::*;
use staffdesk::database::{MemoryStore, Store};
use staffdesk::{AppState, routes};

// Test application wrapper over the in-memory store
pub struct TestApp {
    pub state: web::Data<AppState>,
    pub store: Arc<MemoryStore>,
    pub config: Config,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_backend(|store| store as Arc<dyn Store>)
    }

    /// Serves requests from `wrap(store)`; `self.store` still sees the underlying rows.
    pub fn with_backend(wrap: impl FnOnce(Arc<MemoryStore>) -> Arc<dyn Store>) -> Self {
        setup_test_env();
        let config = Config::test_config();
        let store = MemoryStore::new_shared();
        let state = web::Data::new(AppState::new(wrap(store.clone()), config.clone()));
        TestApp {
            state,
            store,
            config,
        }
    }

    /// Sends one request through the full route table; returns status and JSON body.
    pub async fn call(&self, req: test::TestRequest) -> (StatusCode, Value) {
        let (status, _, body) = self.call_with_headers(req).await;
        (status, body)
    }

    pub async fn call_with_headers(&self, req: test::TestRequest) -> (StatusCode, HeaderMap, Value) {
        let app = test::init_service(
            App::new()
                .app_data(self.state.clone())
                .configure(routes::configure),
        )
        .await;
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body: Value = test::read_body_json(resp).await;
        (status, headers, body)
    }

    pub async fn operation(&self, name: &str, token: Option<&str>, args: Value) -> (StatusCode, Value) {
        let mut req = test::TestRequest::post()
            .uri(&format!("/api/v1/operations/{}", name))
            .set_json(&args);
        if let Some(token) = token {
            req = req.insert_header(AuthHelper::auth_header(token));
        }
        self.call(req).await
    }

    /// Runs an operation expected to succeed and returns its `data`.
    pub async fn ok(&self, name: &str, token: Option<&str>, args: Value) -> Value {
        let (status, body) = self.operation(name, token, args).await;
        assert_eq!(status, StatusCode::OK, "{} failed: {}", name, body);
        TestAssertions::assert_success_response(&body)
    }

    pub async fn batch(&self, token: Option<&str>, operations: Value) -> (StatusCode, Value) {
        let mut req = test::TestRequest::post()
            .uri("/api/v1/operations")
            .set_json(json!({ "operations": operations }));
        if let Some(token) = token {
            req = req.insert_header(AuthHelper::auth_header(token));
        }
        self.call(req).await
    }

    pub async fn seed_employee(&self, input: NewEmployee) -> Employee {
        self.store
            .create_employee(input)
            .await
            .expect("Failed to seed employee")
    }

    /// Login account with a hashed password; `employee_id` links it to a profile.
    pub async fn seed_user(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
        employee_id: Option<String>,
    ) -> User {
        self.state
            .services
            .auth
            .create_account(email, password, role, employee_id)
            .await
            .expect("Failed to seed user")
    }

    pub async fn admin_token(&self) -> (User, String) {
        let user = self
            .seed_user("admin@example.com", "admin-password", UserRole::Admin, None)
            .await;
        let token = AuthHelper::create_test_token(&user, &self.config);
        (user, token)
    }

    /// Employee profile plus its linked login account.
    pub async fn employee_account(&self, email: &str) -> (Employee, User, String) {
        let mut input = MockData::employee(Department::Engineering, 30);
        input.email = email.to_string();
        let employee = self.seed_employee(input).await;
        let user = self
            .seed_user(email, "employee-password", UserRole::Employee, Some(employee.id.clone()))
            .await;
        let token = AuthHelper::create_test_token(&user, &self.config);
        (employee, user, token)
    }
}

// Mock data generators
pub struct MockData;

impl MockData {
    pub fn employee(department: Department, age: i32) -> NewEmployee {
        let name: String = Name().fake();
        NewEmployee {
            email: format!("{}@example.com", uuid::Uuid::new_v4().simple()),
            name,
            phone: None,
            age,
            department,
            position: "Engineer".to_string(),
            join_date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            salary: Some((40_000..120_000).fake::<i32>() as f64),
            status: EmployeeStatus::Active,
            attendance: 92.5,
            role: UserRole::Employee,
            avatar: None,
        }
    }

    pub fn named(name: &str, department: Department, age: i32) -> NewEmployee {
        NewEmployee {
            name: name.to_string(),
            ..Self::employee(department, age)
        }
    }
}

// Authentication helpers
pub struct AuthHelper;

impl AuthHelper {
    pub fn create_test_token(user: &User, config: &Config) -> String {
        staffdesk::services::TokenService::from_config(config)
            .issue(&user.id, user.role)
            .expect("Failed to issue test token")
    }

    pub fn auth_header(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", token))
    }
}

// Test assertion helpers
pub struct TestAssertions;

impl TestAssertions {
    pub fn assert_success_response(body: &Value) -> Value {
        assert_eq!(
            body["success"],
            json!(true),
            "Expected successful response but got error: {}",
            body["message"]
        );
        body["data"].clone()
    }

    pub fn assert_error_code(body: &Value, code: &str) {
        assert_eq!(body["success"], json!(false), "Expected an error: {}", body);
        assert_eq!(body["code"], json!(code), "Unexpected error: {}", body);
    }
}

pub fn setup_test_env() {
    unsafe {
        env::set_var("RUST_LOG", "debug");
    }
    let _ = env_logger::builder().is_test(true).try_init();
}
