// Query module - the safe lookup contract and its error taxonomy
pub mod executor;

pub use executor::{format_rows, QueryExecutor};

use thiserror::Error;

/// The three ways a lookup can fail
/// Nothing is swallowed and nothing is retried here - retry policy belongs
/// to the caller
#[derive(Debug, Error)]
pub enum LookupError {
    /// The requested table or column is not in the catalog
    /// Rejected before any connection is opened
    #[error("'{table}.{column}' is not in the catalog")]
    InvalidSchemaReference { table: String, column: String },

    /// A connection to the store could not be established
    #[error("cannot open store at '{path}'")]
    StoreUnavailable {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The store rejected the statement, e.g. the catalog names a table
    /// the actual database does not have
    #[error("lookup failed against the store")]
    ExecutionFailed(#[source] rusqlite::Error),
}
