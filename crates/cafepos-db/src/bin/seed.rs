//! # Seed Data Generator
//!
//! Populates a database with a café menu for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p cafepos-db --bin seed
//! cargo run -p cafepos-db --bin seed -- --db ./data/cafe.db
//! ```
//!
//! Creates categories, a small product catalogue with starting stock,
//! two operators and a couple of customers. Skips seeding when the
//! database already has products.

use chrono::Utc;
use std::env;

use cafepos_core::{Customer, Operator, Product};
use cafepos_db::repository::generate_id;
use cafepos_db::{Database, DbConfig};

/// Menu: category name → (product name, price cents, starting stock).
const MENU: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "Hot Drinks",
        &[
            ("Espresso", 350, 80),
            ("Double Espresso", 450, 80),
            ("Americano", 400, 60),
            ("Cappuccino", 550, 60),
            ("Latte", 600, 60),
            ("Flat White", 600, 40),
            ("Mocha", 650, 40),
            ("Hot Chocolate", 550, 30),
            ("Chai Latte", 600, 25),
        ],
    ),
    (
        "Cold Drinks",
        &[
            ("Iced Latte", 650, 40),
            ("Iced Tea", 450, 30),
            ("Cold Brew", 550, 25),
            ("Fresh Orange Juice", 700, 20),
            ("Sparkling Water", 350, 48),
        ],
    ),
    (
        "Bakery",
        &[
            ("Croissant", 450, 24),
            ("Pain au Chocolat", 500, 18),
            ("Cheese Bread", 400, 30),
            ("Banana Bread Slice", 475, 16),
            ("Brownie", 450, 20),
            ("Cheesecake Slice", 1000, 12),
            ("Carrot Cake Slice", 950, 12),
        ],
    ),
    (
        "Savoury",
        &[
            ("Ham & Cheese Toastie", 850, 15),
            ("Caprese Sandwich", 900, 12),
            ("Quiche Slice", 800, 10),
            ("Granola Bowl", 750, 10),
        ],
    ),
];

const OPERATORS: &[(&str, &str)] = &[("Marta Lima", "manager"), ("Jonas Prado", "cashier")];

const CUSTOMERS: &[(&str, Option<&str>)] = &[
    ("Ana Souza", Some("555-0101")),
    ("Rafael Costa", None),
    ("Beatriz Nunes", Some("555-0144")),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./cafepos_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Café POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./cafepos_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Café POS Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    let now = Utc::now();
    let mut product_count = 0usize;

    for (category_name, items) in MENU {
        let category_id = generate_id();
        sqlx::query("INSERT INTO categories (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&category_id)
            .bind(*category_name)
            .bind(now)
            .execute(db.pool())
            .await?;

        for (name, price_cents, stock) in items.iter() {
            let product = Product {
                id: generate_id(),
                name: name.to_string(),
                price_cents: *price_cents,
                quantity_on_hand: *stock,
                category_id: Some(category_id.clone()),
                created_at: now,
                updated_at: now,
            };
            db.products().insert(&product).await?;
            product_count += 1;
        }
    }

    for (display_name, role) in OPERATORS {
        let operator = Operator {
            id: generate_id(),
            display_name: display_name.to_string(),
            role: role.to_string(),
            created_at: now,
        };
        db.operators().insert(&operator).await?;
    }

    for (name, phone) in CUSTOMERS {
        let customer = Customer {
            id: generate_id(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
            created_at: now,
        };
        db.customers().insert(&customer).await?;
    }

    println!(
        "✓ Seeded {} products, {} operators, {} customers",
        product_count,
        OPERATORS.len(),
        CUSTOMERS.len()
    );

    db.close().await;
    Ok(())
}
