// Catalog module - the identifier allow-list
// Table and column names cannot be sent to the store as bound parameters
// (the statement has to be compiled before values are bound), so they must
// come from a closed set we control instead of from user input
// The catalog is that closed set
//
// Identifiers are also validated on construction, so even a catalog loaded
// from a config file cannot carry SQL metacharacters into query text

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One allow-listed table and the columns a lookup may filter on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<String>,
}

impl TableSpec {
    /// Convenience constructor for building a catalog in code
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// The closed allow-list of queryable identifiers
/// Built once (in code or from JSON) and read-only afterwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    tables: Vec<TableSpec>,
}

/// A resolved (table, column) pair
///
/// The strings borrow from the catalog itself, never from caller input.
/// Only these borrowed identifiers are ever spliced into query text, which
/// is what makes the allow-list a structural guarantee rather than a check.
#[derive(Debug, Clone, Copy)]
pub struct Binding<'a> {
    pub table: &'a str,
    pub column: &'a str,
}

impl Catalog {
    /// Create a catalog from table specs, validating every identifier
    pub fn new(tables: Vec<TableSpec>) -> Result<Self> {
        let catalog = Self { tables };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON string
    ///
    /// Format: {"tables": [{"name": "users", "columns": ["id", "name"]}]}
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json).context("invalid catalog JSON")?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read catalog file '{}'", path.display()))?;
        Self::from_json(&json)
    }

    /// Resolve a (table, column) pair against the allow-list
    /// Returns None for anything not listed - the caller decides how to fail
    pub fn resolve(&self, table: &str, column: &str) -> Option<Binding<'_>> {
        let spec = self.tables.iter().find(|t| t.name == table)?;
        let column = spec.columns.iter().find(|c| c.as_str() == column)?;
        Some(Binding {
            table: &spec.name,
            column,
        })
    }

    /// List the allow-listed tables
    pub fn tables(&self) -> &[TableSpec] {
        &self.tables
    }

    fn validate(&self) -> Result<()> {
        if self.tables.is_empty() {
            bail!("catalog must list at least one table");
        }
        for spec in &self.tables {
            ensure_identifier(&spec.name)?;
            if spec.columns.is_empty() {
                bail!("table '{}' must list at least one column", spec.name);
            }
            for column in &spec.columns {
                ensure_identifier(column)?;
            }
        }
        Ok(())
    }
}

/// Check that a name is safe to appear in query text:
/// ASCII letter or underscore first, then letters, digits and underscores
fn ensure_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if !valid {
        bail!(
            "'{}' is not a valid identifier (ASCII letters, digits and underscores only)",
            name
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_catalog() -> Catalog {
        Catalog::new(vec![TableSpec::new("users", &["id", "name"])]).unwrap()
    }

    #[test]
    fn test_resolve_known_identifiers() {
        let catalog = users_catalog();

        let binding = catalog.resolve("users", "name").unwrap();
        assert_eq!(binding.table, "users");
        assert_eq!(binding.column, "name");
    }

    #[test]
    fn test_resolve_rejects_unknown_identifiers() {
        let catalog = users_catalog();

        assert!(catalog.resolve("orders", "name").is_none());
        assert!(catalog.resolve("users", "password").is_none());
        // Injection attempts in the identifier position never resolve
        assert!(catalog.resolve("users; DROP TABLE users", "name").is_none());
        assert!(catalog.resolve("users", "name = '' OR 1=1 --").is_none());
    }

    #[test]
    fn test_construction_rejects_bad_identifiers() {
        assert!(Catalog::new(vec![TableSpec::new("users-prod", &["id"])]).is_err());
        assert!(Catalog::new(vec![TableSpec::new("users", &["na me"])]).is_err());
        assert!(Catalog::new(vec![TableSpec::new("1users", &["id"])]).is_err());
        assert!(Catalog::new(vec![TableSpec::new("", &["id"])]).is_err());
        assert!(Catalog::new(vec![]).is_err());
        assert!(Catalog::new(vec![TableSpec::new("users", &[])]).is_err());
    }

    #[test]
    fn test_from_json() {
        let catalog =
            Catalog::from_json(r#"{"tables": [{"name": "users", "columns": ["id", "name"]}]}"#)
                .unwrap();
        assert!(catalog.resolve("users", "id").is_some());

        // A catalog file with a hostile identifier is refused outright
        let hostile = r#"{"tables": [{"name": "users WHERE 1=1; --", "columns": ["id"]}]}"#;
        assert!(Catalog::from_json(hostile).is_err());
    }
}
