pub mod activity_logger;
pub mod auth;
pub mod authorization;
pub mod context;
pub mod loader;
pub mod query_shaper;
pub mod token;

pub use activity_logger::ActivityLogger;
pub use auth::AuthService;
pub use authorization::{RoleRequirement, authorize};
pub use context::{AppServices, RequestContext};
pub use token::{Principal, TokenService};
