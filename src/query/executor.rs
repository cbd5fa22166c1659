// Query Executor
// This module executes lookups against the store without ever letting
// untrusted input alter the query structure
//
// The vulnerable pattern this replaces builds query text out of the value:
//     SELECT * FROM users WHERE name = 'x' OR '1'='1'   <-- value became code
//
// Two rules prevent that here:
// 1. Identifiers (table, column) come from the catalog, a closed allow-list
// 2. The filter value travels as a bound parameter, never inside query text

use crate::catalog::Catalog;
use crate::query::LookupError;
use crate::store::{self, Row, StoreConfig, Value};
use rusqlite::params;

/// The query executor - the single safe entry point for lookups
/// Stateless between calls: each lookup opens and releases its own connection
pub struct QueryExecutor {
    /// The identifier allow-list
    catalog: Catalog,
    /// How to reach the store
    config: StoreConfig,
}

impl QueryExecutor {
    /// Create an executor over a catalog and a store configuration
    pub fn new(catalog: Catalog, config: StoreConfig) -> Self {
        Self { catalog, config }
    }

    /// Look up all rows of `target_table` where `filter_column = filter_value`
    ///
    /// `target_table` and `filter_column` must be in the catalog; anything
    /// else fails with `InvalidSchemaReference` before the store is touched.
    /// `filter_value` may be any scalar, hostile or not - it is bound as data
    /// and cannot change what the statement does.
    ///
    /// Rows come back in the store's natural return order.
    pub fn lookup(
        &self,
        target_table: &str,
        filter_column: &str,
        filter_value: &Value,
    ) -> Result<Vec<Row>, LookupError> {
        // 1. Allow-list check, before any I/O
        let binding = self
            .catalog
            .resolve(target_table, filter_column)
            .ok_or_else(|| LookupError::InvalidSchemaReference {
                table: target_table.to_string(),
                column: filter_column.to_string(),
            })?;

        // 2. Scoped connection - dropped on every exit path below
        let conn = store::open_read_only(&self.config).map_err(|source| {
            LookupError::StoreUnavailable {
                path: self.config.path.display().to_string(),
                source,
            }
        })?;

        // 3. Only the catalog's own identifier strings reach the query text;
        //    the filter value stays out of it entirely (bound as ?1)
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1",
            binding.table, binding.column
        );

        let mut stmt = conn.prepare(&sql).map_err(LookupError::ExecutionFailed)?;

        // Column names are only known after preparing the statement
        let column_names: Vec<String> =
            stmt.column_names().into_iter().map(String::from).collect();

        // 4. Execute with the value bound as a parameter and fetch all rows
        let mapped = stmt
            .query_map(params![filter_value], |row| {
                let mut columns = Vec::with_capacity(column_names.len());
                for (i, name) in column_names.iter().enumerate() {
                    columns.push((name.clone(), Value::from(row.get_ref(i)?)));
                }
                Ok(Row { columns })
            })
            .map_err(LookupError::ExecutionFailed)?;

        let mut rows = Vec::new();
        for row in mapped {
            rows.push(row.map_err(LookupError::ExecutionFailed)?);
        }

        Ok(rows)
    }

    /// Get the catalog this executor resolves identifiers against
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

/// Format rows as a string for display
/// This creates a nice table format for lookup results
pub fn format_rows(rows: &[Row]) -> String {
    if rows.is_empty() {
        return "No rows found".to_string();
    }

    let column_names: Vec<&str> = rows[0]
        .columns
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();

    // Calculate column widths
    let mut widths: Vec<usize> = column_names.iter().map(|c| c.len()).collect();

    for row in rows {
        for (i, (_, value)) in row.columns.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(value.to_string().len());
            }
        }
    }

    let mut result = String::new();

    // Header row
    result.push_str("┌");
    for (i, width) in widths.iter().enumerate() {
        result.push_str(&"─".repeat(width + 2));
        if i < widths.len() - 1 {
            result.push_str("┬");
        }
    }
    result.push_str("┐\n");

    // Column names
    result.push_str("│");
    for (name, &width) in column_names.iter().zip(&widths) {
        result.push_str(&format!(" {:<width$} ", name, width = width));
        result.push_str("│");
    }
    result.push('\n');

    // Separator
    result.push_str("├");
    for (i, width) in widths.iter().enumerate() {
        result.push_str(&"─".repeat(width + 2));
        if i < widths.len() - 1 {
            result.push_str("┼");
        }
    }
    result.push_str("┤\n");

    // Data rows
    for row in rows {
        result.push_str("│");
        for ((_, value), &width) in row.columns.iter().zip(&widths) {
            result.push_str(&format!(" {:<width$} ", value.to_string(), width = width));
            result.push_str("│");
        }
        result.push('\n');
    }

    // Bottom border
    result.push_str("└");
    for (i, width) in widths.iter().enumerate() {
        result.push_str(&"─".repeat(width + 2));
        if i < widths.len() - 1 {
            result.push_str("┴");
        }
    }
    result.push_str("┘\n");

    result.push_str(&format!("\n{} row(s) returned", rows.len()));

    result
}
