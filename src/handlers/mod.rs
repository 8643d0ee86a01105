pub mod activity;
pub mod auth;
pub mod dashboard;
pub mod employees;
pub mod leave;
pub mod operations;
pub mod registry;
pub mod shared;

pub use registry::{OperationRegistry, OperationSpec};
