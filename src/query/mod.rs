// Query module - parses query-mode arguments and runs the statement
pub mod executor;
pub mod request;

pub use executor::{run, QueryExecutor};
pub use request::QueryRequest;
