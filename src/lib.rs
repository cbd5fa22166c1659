// SafeQuery - parameterized lookups against a relational store
// This is the library root that exposes the public API

pub mod catalog;
pub mod query;
pub mod store;

// Re-export commonly used types for convenience
pub use catalog::{Binding, Catalog, TableSpec};
pub use query::{executor::QueryExecutor, format_rows, LookupError};
pub use store::{Row, StoreConfig, Value};
