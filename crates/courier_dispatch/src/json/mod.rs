pub mod scenario;
pub mod schema;
pub mod types;
