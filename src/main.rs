// Main entry point for the SafeQuery CLI
// This provides an interactive shell to run allow-listed lookups
// against a SQLite database file

use anyhow::{anyhow, Result};
use clap::Parser as ClapParser;
use safequery::{format_rows, Catalog, QueryExecutor, StoreConfig, TableSpec, Value};
use std::io::{self, Write};
use std::path::PathBuf;

/// SafeQuery - parameterized lookups against a SQLite store
#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long)]
    database: PathBuf,

    /// Path to a catalog JSON file (defaults to a small demo catalog)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Execute a single lookup and exit, e.g. "users.name = 'alice'"
    #[arg(short, long)]
    execute: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => Catalog::from_json_file(path)?,
        None => demo_catalog()?,
    };

    let executor = QueryExecutor::new(catalog, StoreConfig::new(&args.database));

    // If a lookup was provided, execute it and exit
    if let Some(filter) = args.execute {
        run_lookup(&executor, &filter)?;
        return Ok(());
    }

    println!("╔════════════════════════════════════════════╗");
    println!("║        SafeQuery Interactive Shell        ║");
    println!("║   Allow-listed, parameter-bound lookups   ║");
    println!("╚════════════════════════════════════════════╝");
    println!();
    println!("Type a lookup like: users.name = 'alice'");
    println!("Type '.help' for help, '.exit' to quit");
    println!();

    repl(&executor)
}

/// The catalog used when none is supplied on the command line
fn demo_catalog() -> Result<Catalog> {
    Catalog::new(vec![TableSpec::new("users", &["id", "name", "email"])])
}

/// REPL (Read-Eval-Print Loop) implementation
/// Reads one filter per line and prints the matching rows
fn repl(executor: &QueryExecutor) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        // Print prompt
        print!("safequery> ");
        stdout.flush()?; // Ensure prompt is displayed immediately

        // Read user input
        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            // End of input (Ctrl-D)
            println!();
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        // Handle special commands (starting with .)
        if input.starts_with('.') {
            match input {
                ".exit" | ".quit" => {
                    println!("Goodbye!");
                    break;
                }
                ".help" => {
                    print_help();
                    continue;
                }
                ".tables" => {
                    print_catalog(executor);
                    continue;
                }
                _ => {
                    println!("Unknown command: {}", input);
                    println!("Type '.help' for help");
                    continue;
                }
            }
        }

        // Run the lookup; a bad line should not end the session
        if let Err(e) = run_lookup(executor, input) {
            eprintln!("Error: {:#}", e);
        }
    }

    Ok(())
}

/// Parse and execute one filter line, printing the matching rows
fn run_lookup(executor: &QueryExecutor, filter: &str) -> Result<()> {
    let (table, column, value) = parse_filter(filter)?;
    let rows = executor.lookup(&table, &column, &value)?;
    println!("{}", format_rows(&rows));
    Ok(())
}

/// Parse a filter line of the form "table.column = value"
/// Only the table and column are interpreted; the value stays opaque
fn parse_filter(input: &str) -> Result<(String, String, Value)> {
    let (target, literal) = input
        .split_once('=')
        .ok_or_else(|| anyhow!("expected a filter like: users.name = 'alice'"))?;

    let (table, column) = target
        .trim()
        .split_once('.')
        .ok_or_else(|| anyhow!("expected 'table.column' on the left of '='"))?;

    Ok((
        table.trim().to_string(),
        column.trim().to_string(),
        Value::parse_literal(literal),
    ))
}

/// Print help information
fn print_help() {
    println!("Special Commands:");
    println!("  .help              Show this help message");
    println!("  .tables            Show the allow-listed tables and columns");
    println!("  .exit, .quit       Exit the shell");
    println!();
    println!("Lookups:");
    println!("  users.name = 'alice'     match rows where name is the text alice");
    println!("  users.id = 42            match rows where id is the integer 42");
    println!("  users.name = ''          match rows where name is the empty string");
    println!();
    println!("Notes:");
    println!("  - Table and column must be listed in the catalog");
    println!("  - The value is bound as a parameter; quotes force text");
    println!();
}

/// Print the tables and columns the catalog allows
fn print_catalog(executor: &QueryExecutor) {
    for spec in executor.catalog().tables() {
        println!("{} ({})", spec.name, spec.columns.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        let (table, column, value) = parse_filter("users.name = 'alice'").unwrap();
        assert_eq!(table, "users");
        assert_eq!(column, "name");
        assert_eq!(value, Value::Text("alice".to_string()));

        let (_, _, value) = parse_filter("users.id = 42").unwrap();
        assert_eq!(value, Value::Integer(42));
    }

    #[test]
    fn test_parse_filter_rejects_malformed_input() {
        assert!(parse_filter("users.name").is_err());
        assert!(parse_filter("name = 'alice'").is_err());
    }

    #[test]
    fn test_parse_filter_keeps_hostile_values_opaque() {
        // Everything right of '=' is value text, including more '=' signs
        let (table, column, value) = parse_filter("users.name = x' OR '1'='1").unwrap();
        assert_eq!(table, "users");
        assert_eq!(column, "name");
        assert_eq!(value, Value::Text("x' OR '1'='1".to_string()));
    }
}
