//! # Admin Seeder
//!
//! Creates the initial admin account and the company-settings row.
//!
//! ## Usage
//! ```bash
//! cargo run -p atelier-api --bin seed -- \
//!     --email admin@atelier-interieur.fr --password 'change-me'
//!
//! # custom database path and display name
//! cargo run -p atelier-api --bin seed -- \
//!     --db ./data/atelier.db --name "Studio Admin" \
//!     --email admin@atelier-interieur.fr --password 'change-me'
//! ```
//!
//! Refuses to run when an admin already exists.

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use chrono::Utc;
use std::env;
use uuid::Uuid;

use atelier_core::Admin;
use atelier_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./atelier.db");
    let mut name = String::from("Atelier Admin");
    let mut email: Option<String> = None;
    let mut password: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--name" | "-n" => {
                if i + 1 < args.len() {
                    name = args[i + 1].clone();
                    i += 1;
                }
            }
            "--email" | "-e" => {
                if i + 1 < args.len() {
                    email = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--password" | "-p" => {
                if i + 1 < args.len() {
                    password = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Atelier Admin Seeder");
                println!();
                println!("Usage: seed --email <EMAIL> --password <PASSWORD> [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -e, --email <EMAIL>        Admin email (required)");
                println!("  -p, --password <PASSWORD>  Admin password (required)");
                println!("  -n, --name <NAME>          Display name (default: Atelier Admin)");
                println!("  -d, --db <PATH>            Database file path (default: ./atelier.db)");
                println!("  -h, --help                 Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let (email, password) = match (email, password) {
        (Some(e), Some(p)) => (e, p),
        _ => {
            eprintln!("error: --email and --password are required (see --help)");
            std::process::exit(1);
        }
    };

    println!("Atelier Admin Seeder");
    println!("====================");
    println!("Database: {db_path}");
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("- connected, migrations applied");

    let existing = db.admins().count().await?;
    if existing > 0 {
        println!("! database already has {existing} admin account(s), nothing to do");
        return Ok(());
    }

    let now = Utc::now();

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| format!("failed to hash password: {e}"))?
        .to_string();

    let admin = Admin {
        id: Uuid::new_v4().to_string(),
        name,
        email,
        password_hash,
        created_at: now,
        updated_at: now,
    };
    db.admins().insert(&admin).await?;
    println!("- admin account created: {}", admin.email);

    // first access creates the defaults row
    let settings = db.settings().current(now).await?;
    println!(
        "- company settings ready (tax rate {}, {} day validity)",
        settings.default_tax_rate(),
        settings.quote_validity_days
    );

    println!();
    println!("Seed complete.");
    Ok(())
}
