//! Print every entry of the key-value store
//! Usage: cargo run --bin store_dump [--db-path /path/to/store.db]

use consul_bot::store::Store;
use std::path::PathBuf;

fn parse_args() -> PathBuf {
    let args: Vec<String> = std::env::args().collect();
    let mut db_path = std::env::var("CONSUL_STORE__PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/store.db"));

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db-path" => {
                if i + 1 < args.len() {
                    db_path = PathBuf::from(&args[i + 1]);
                    i += 2;
                } else {
                    eprintln!("ERROR: --db-path requires a value");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                println!("Usage: store_dump [--db-path PATH]");
                println!("  --db-path PATH  Path to store.db (default: $CONSUL_STORE__PATH or data/store.db)");
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                std::process::exit(1);
            }
        }
    }

    db_path
}

/// Pretty JSON when the value decodes as JSON, hex otherwise
fn render_value(value: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(value) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or_else(|_| hex::encode(value)),
        Err(_) => hex::encode(value),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let db_path = parse_args();

    if !db_path.exists() {
        eprintln!("ERROR: Store not found at {}", db_path.display());
        std::process::exit(1);
    }

    let store = Store::open_read_only(&db_path).await?;

    let entries = store.scan_all().await?;

    println!("=== Consul Store Dump ===");
    println!("Store: {}", db_path.display());
    println!("Entries: {}", entries.len());
    println!();

    for (key, value) in &entries {
        println!("{}", key);
        println!("{}", render_value(value));
        println!();
    }

    store.close().await;
    Ok(())
}
