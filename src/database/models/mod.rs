pub mod activity;
pub mod employee;
pub mod leave_request;
pub(crate) mod macros;
pub mod stats;
pub mod user;

// Re-export all models for easy importing
pub use activity::*;
pub use employee::*;
pub use leave_request::*;
pub use stats::*;
pub use user::*;
