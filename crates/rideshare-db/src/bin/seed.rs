//! # Seed Data Generator
//!
//! Writes the demo accounts and sample rides into a database.
//!
//! ## Usage
//! ```bash
//! # Seed ./rideshare_dev.db (default)
//! cargo run -p rideshare-db --bin seed
//!
//! # Specify database path
//! cargo run -p rideshare-db --bin seed -- --db ./data/rideshare.db
//!
//! # Replace whatever is stored
//! cargo run -p rideshare-db --bin seed -- --force
//! ```

use chrono::Utc;
use rideshare_core::demo;
use rideshare_db::{Database, DbConfig};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./rideshare_dev.db");
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--force" | "-f" => force = true,
            "--help" | "-h" => {
                println!("Rideshare Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./rideshare_dev.db)");
                println!("  -f, --force        Overwrite existing rides and accounts");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Rideshare Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if let Some(existing) = db.rides().load_all().await? {
        if !force {
            println!("⚠ Database already has {} rides", existing.len());
            println!("  Skipping seed to avoid overwriting them.");
            println!("  Pass --force to replace them.");
            return Ok(());
        }
    }

    let accounts = demo::demo_principals();
    let rides = demo::sample_rides(Utc::now());

    db.accounts().save_snapshot(&rides, &accounts, None).await?;

    println!();
    println!("✓ Seeded {} accounts", accounts.len());
    for account in &accounts {
        println!("  {:>2}  {:<12} {:<9} {}", account.id, account.name, account.role.as_str(), account.balance());
    }
    println!("✓ Seeded {} rides", rides.len());
    for ride in &rides {
        println!("  {:>2}  {:<11} {}", ride.id, ride.status.as_str(), ride.price());
    }

    db.close().await;
    Ok(())
}
