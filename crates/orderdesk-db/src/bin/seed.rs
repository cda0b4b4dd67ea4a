//! # Seed Data Generator
//!
//! Populates a development database with demo clients, products and orders.
//!
//! ## Usage
//! ```bash
//! # Seed ./orderdesk_dev.db
//! cargo run -p orderdesk-db --bin seed
//!
//! # Specify database path
//! cargo run -p orderdesk-db --bin seed -- --db ./data/orderdesk.db
//! ```
//!
//! ## Generated Data
//! - 12 clients with unique emails
//! - 20 products across a few grocery lines, priced $0.99 - $49.90
//! - 15 orders with one to four lines each
//!
//! Orders go through `OrderRepository::save`, so their totals follow the
//! same rule as orders entered in the browser.

use std::env;

use orderdesk_core::{ClientInput, Money, OrderInput, OrderLineInput, ProductInput, Weight};
use orderdesk_db::{Database, DbConfig};

const DEFAULT_DB_PATH: &str = "./orderdesk_dev.db";

/// (name, street)
const CLIENTS: &[(&str, &str)] = &[
    ("Ana Souza", "Rua das Flores, 12"),
    ("Bruno Lima", "Av. Paulista, 1000"),
    ("Carla Mendes", "Rua Augusta, 455"),
    ("Daniel Rocha", "Rua XV de Novembro, 88"),
    ("Eduarda Alves", "Av. Brasil, 2020"),
    ("Felipe Costa", "Rua da Consolação, 310"),
    ("Gabriela Nunes", "Rua Oscar Freire, 77"),
    ("Henrique Dias", "Av. Rebouças, 1500"),
    ("Isabela Ramos", "Rua Haddock Lobo, 59"),
    ("João Pereira", "Rua Bela Cintra, 901"),
    ("Karina Teixeira", "Av. Faria Lima, 3100"),
    ("Lucas Martins", "Rua Vergueiro, 640"),
];

/// (name, description, price in cents, weight in grams)
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("Coffee 500g", "Ground roasted coffee", 1_890, 500),
    ("Coffee Beans 1kg", "Whole roasted beans", 4_990, 1_000),
    ("Green Tea", "Box with 20 sachets", 699, 40),
    ("Black Tea", "Box with 20 sachets", 649, 40),
    ("Sugar 1kg", "Refined white sugar", 459, 1_000),
    ("Brown Sugar 1kg", "Unrefined cane sugar", 789, 1_000),
    ("Whole Milk 1L", "UHT whole milk", 549, 1_030),
    ("Oat Milk 1L", "Plant based drink", 1_299, 1_030),
    ("Butter 200g", "Salted butter", 1_149, 200),
    ("Cheddar 150g", "Sliced cheddar cheese", 1_399, 150),
    ("Rice 5kg", "Long grain white rice", 2_890, 5_000),
    ("Black Beans 1kg", "Dried black beans", 899, 1_000),
    ("Pasta 500g", "Durum wheat spaghetti", 499, 500),
    ("Tomato Sauce", "Traditional, 340g pouch", 349, 340),
    ("Olive Oil 500ml", "Extra virgin", 3_490, 460),
    ("Orange Juice 1L", "Not from concentrate", 999, 1_050),
    ("Sparkling Water", "Bottle, 500ml", 299, 520),
    ("Chocolate Bar", "70% cocoa, 100g", 1_099, 100),
    ("Crackers", "Cream crackers, 200g", 399, 200),
    ("Napkins", "Pack of 50", 99, 120),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from(DEFAULT_DB_PATH);

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
                println!("OrderDesk Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: {})", DEFAULT_DB_PATH);
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 OrderDesk Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.clients().count().await? + db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has data");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    let mut client_ids = Vec::with_capacity(CLIENTS.len());
    for (index, (name, street)) in CLIENTS.iter().enumerate() {
        let client = db.clients().insert(&client_input(index, name, street)).await?;
        client_ids.push(client.id);
    }
    println!("✓ Inserted {} clients", client_ids.len());

    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for (name, description, cents, grams) in PRODUCTS {
        let product = db
            .products()
            .insert(&ProductInput {
                name: name.to_string(),
                description: description.to_string(),
                price: Money::from_cents(*cents),
                weight: Weight::from_grams(*grams),
            })
            .await?;
        product_ids.push(product.id);
    }
    println!("✓ Inserted {} products", product_ids.len());

    let mut revenue = Money::zero();
    for seed in 0..15 {
        let order = db
            .orders()
            .save(None, &order_input(seed, &client_ids, &product_ids))
            .await?;
        revenue += order.total_price;
    }

    println!("✓ Inserted 15 orders, {} in total", revenue);
    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}

fn client_input(index: usize, name: &str, street: &str) -> ClientInput {
    let email_user: String = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect();

    ClientInput {
        name: name.to_string(),
        email: format!("{}@example.com", email_user),
        address: street.to_string(),
        postal_code: format!("{:08}", 1_310_100 + index * 37),
    }
}

/// Builds a deterministic order: every third one has no client.
fn order_input(seed: usize, clients: &[i64], products: &[i64]) -> OrderInput {
    let client_id = if seed % 3 == 2 {
        None
    } else {
        Some(clients[seed % clients.len()])
    };

    let line_count = 1 + seed % 4;
    let lines = (0..line_count)
        .map(|n| OrderLineInput {
            id: None,
            product_id: Some(products[(seed * 7 + n * 3) % products.len()]),
            quantity: 1 + ((seed + n) % 5) as i64,
        })
        .collect();

    OrderInput {
        client_id,
        delivery_days: (seed % 10) as i64,
        lines,
    }
}
