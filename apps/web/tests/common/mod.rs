//! Shared setup for the HTTP tests: the real router on an in-memory
//! database.

#![allow(dead_code)]

use axum_test::TestServer;
use orderdesk_core::{ClientInput, Money, OrderInput, OrderLineInput, ProductInput, Weight};
use orderdesk_db::{Database, DbConfig};
use orderdesk_web::{build_router, AppState};

pub async fn create_test_server() -> (TestServer, Database) {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("Failed to open in-memory database");
    let server = TestServer::try_new(build_router(AppState::with_defaults(db.clone())))
        .expect("Failed to create test server");
    (server, db)
}

pub async fn add_client(db: &Database, name: &str) -> i64 {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    db.clients()
        .insert(&ClientInput {
            name: name.to_string(),
            email,
            address: "Rua das Flores, 12".to_string(),
            postal_code: "01310100".to_string(),
        })
        .await
        .expect("Failed to insert client")
        .id
}

pub async fn add_product(db: &Database, name: &str, cents: i64) -> i64 {
    db.products()
        .insert(&ProductInput {
            name: name.to_string(),
            description: format!("{} description", name),
            price: Money::from_cents(cents),
            weight: Weight::from_grams(500),
        })
        .await
        .expect("Failed to insert product")
        .id
}

pub async fn add_order(db: &Database, client_id: Option<i64>, lines: &[(i64, i64)]) -> i64 {
    let lines = lines
        .iter()
        .map(|&(product_id, quantity)| OrderLineInput {
            id: None,
            product_id: Some(product_id),
            quantity,
        })
        .collect();

    db.orders()
        .save(
            None,
            &OrderInput {
                client_id,
                delivery_days: 2,
                lines,
            },
        )
        .await
        .expect("Failed to save order")
        .id
}

pub async fn count_rows(db: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(db.pool())
        .await
        .expect("Failed to count rows")
}
