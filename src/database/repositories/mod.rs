pub mod activity;
pub mod employee;
pub mod leave_request;
pub mod user;

// Re-export all repositories for easy importing
pub use activity::ActivityRepository;
pub use employee::EmployeeRepository;
pub use leave_request::LeaveRequestRepository;
pub use user::UserRepository;
