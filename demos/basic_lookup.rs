// Example: Basic safe lookup usage
// Run with: cargo run --example basic_lookup

use rusqlite::Connection;
use safequery::{format_rows, Catalog, QueryExecutor, StoreConfig, TableSpec, Value};

fn main() -> anyhow::Result<()> {
    println!("=== SafeQuery Basic Lookup Example ===\n");

    // 1. Seed a throwaway database file
    println!("1. Seeding a 'users' table...");
    let path = std::env::temp_dir().join("safequery_demo.sqlite");
    let _ = std::fs::remove_file(&path);
    let conn = Connection::open(&path)?;
    conn.execute_batch(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, email TEXT);
         INSERT INTO users VALUES (1, 'alice', 'alice@example.com');
         INSERT INTO users VALUES (2, 'bob', 'bob@example.com');",
    )?;
    drop(conn);
    println!("Seeded {}\n", path.display());

    // 2. Build the executor: allow-list plus store configuration
    println!("2. Building the executor with an allow-list of (users, [id, name])...");
    let catalog = Catalog::new(vec![TableSpec::new("users", &["id", "name"])])?;
    let executor = QueryExecutor::new(catalog, StoreConfig::new(&path));
    println!();

    // 3. A normal lookup
    println!("3. Looking up users.name = 'alice'...");
    let rows = executor.lookup("users", "name", &Value::from("alice"))?;
    println!("{}\n", format_rows(&rows));

    // 4. A hostile value is just a value
    println!("4. Looking up the injection payload \"alice' OR '1'='1\"...");
    let rows = executor.lookup("users", "name", &Value::from("alice' OR '1'='1"))?;
    println!("{}\n", format_rows(&rows));

    // 5. Identifiers outside the allow-list never reach the store
    println!("5. Looking up a column that is not allow-listed...");
    match executor.lookup("users", "email", &Value::from("alice@example.com")) {
        Ok(_) => println!("unexpectedly allowed"),
        Err(e) => println!("Rejected: {}\n", e),
    }

    std::fs::remove_file(&path)?;
    println!("=== Example Complete ===");
    Ok(())
}
