// Public modules
pub mod health_status;
pub mod query_request;
pub mod query_response;

// Re-exports
pub use health_status::HealthStatus;
pub use query_request::QueryRequest;
pub use query_response::{ErrorResponse, QueryResponse};
