use actix_web::HttpRequest;
use std::sync::Arc;

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;
pub use database::{MemoryStore, PgStore, Store};
pub use error::{AppError, ErrorKind};
pub use handlers::OperationRegistry;
pub use services::{AppServices, RequestContext};

pub struct AppState {
    pub config: Config,
    pub services: AppServices,
    pub registry: OperationRegistry,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            services: AppServices::new(store, &config),
            registry: OperationRegistry::new(),
            config,
        }
    }

    /// Fresh per-request context; a missing or invalid token leaves it anonymous.
    pub fn request_context(&self, req: &HttpRequest) -> RequestContext {
        let principal = self.services.auth.tokens().principal_from_request(req);
        RequestContext::new(self.services.clone(), principal)
    }

    /// Creates the configured bootstrap admin, if any.
    pub async fn ensure_bootstrap_admin(&self) -> Result<(), AppError> {
        match (&self.config.admin_email, &self.config.admin_password) {
            (Some(email), Some(password)) => self.services.auth.ensure_admin(email, password).await,
            (Some(_), None) | (None, Some(_)) => {
                log::warn!("ADMIN_EMAIL and ADMIN_PASSWORD must both be set; skipping bootstrap admin");
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }
}
