use actix_web::{HttpRequest, HttpResponse, Result, http::header, web};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AppState;
use crate::error::{AppError, ErrorKind};
use crate::handlers::registry::{OperationDescriptor, OperationKind};
use crate::handlers::shared::ApiResponse;
use crate::middleware::RequestIdExt;
use crate::services::RequestContext;

fn parse_arguments(body: &[u8]) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_argument(format!("Malformed JSON body: {}", e)))
}

/// POST /api/v1/operations/{name}
pub async fn execute_operation(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let name = path.into_inner();
    let args = parse_arguments(&body)?;
    let ctx = state.request_context(&req);

    log::debug!(
        "Operation {} requested (correlation_id={})",
        name,
        req.correlation_id().unwrap_or_default()
    );

    let data = state.registry.execute(&ctx, &name, args).await?;
    let mut response = HttpResponse::Ok();
    // Login also hands the token back as a header for clients that read it there
    if name == "login" {
        if let Some(token) = data.get("token").and_then(Value::as_str) {
            response.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)));
        }
    }
    Ok(response.json(ApiResponse::success(data)))
}

#[derive(Debug, Deserialize)]
pub struct BatchEntry {
    pub name: String,
    pub alias: Option<String>,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub operations: Vec<BatchEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResult {
    pub name: String,
    pub alias: Option<String>,
    pub success: bool,
    pub data: Option<Value>,
    pub message: Option<String>,
    pub code: Option<ErrorKind>,
}

impl BatchResult {
    fn new(entry: &BatchEntry, outcome: Result<Value, AppError>) -> Self {
        let (success, data, message, code) = match outcome {
            Ok(data) => (true, Some(data), None, None),
            Err(e) => (false, None, Some(e.to_string()), Some(e.kind())),
        };
        Self {
            name: entry.name.clone(),
            alias: entry.alias.clone(),
            success,
            data,
            message,
            code,
        }
    }
}

async fn run_entry(state: &AppState, ctx: &RequestContext, entry: &BatchEntry) -> BatchResult {
    let outcome = state
        .registry
        .execute(ctx, &entry.name, entry.arguments.clone())
        .await;
    BatchResult::new(entry, outcome)
}

/// POST /api/v1/operations
///
/// All entries share one request context. Query-only batches resolve
/// concurrently so their loader lookups coalesce; a batch containing any
/// mutation runs strictly in order.
pub async fn execute_batch(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let batch: BatchRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::invalid_argument(format!("Malformed batch: {}", e)))?;
    if batch.operations.is_empty() {
        return Err(AppError::invalid_argument("Batch contains no operations"));
    }

    let ctx = state.request_context(&req);
    let has_mutation = batch.operations.iter().any(|entry| {
        state
            .registry
            .get(&entry.name)
            .is_some_and(|spec| spec.kind == OperationKind::Mutation)
    });

    let results = if has_mutation {
        let mut results = Vec::with_capacity(batch.operations.len());
        for entry in &batch.operations {
            results.push(run_entry(&state, &ctx, entry).await);
        }
        results
    } else {
        join_all(
            batch
                .operations
                .iter()
                .map(|entry| run_entry(&state, &ctx, entry)),
        )
        .await
    };

    log::debug!(
        "Batch of {} operation(s) completed (correlation_id={})",
        results.len(),
        req.correlation_id().unwrap_or_default()
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(results)))
}

/// GET /api/v1/operations
pub async fn list_operations(state: web::Data<AppState>) -> Result<HttpResponse> {
    let operations: Vec<OperationDescriptor> =
        state.registry.specs().map(OperationDescriptor::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(operations)))
}

/// GET /health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}
