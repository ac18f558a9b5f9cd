//! Shared fixtures for engine tests: an in-memory database and seeded
//! operators, products and customers.

use chrono::Utc;

use cafepos_core::{Customer, Operator, Product};
use cafepos_db::repository::generate_id;
use cafepos_db::{Database, DbConfig};

pub async fn db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub async fn seed_operator(db: &Database, name: &str) -> String {
    let operator = Operator {
        id: generate_id(),
        display_name: name.to_string(),
        role: "cashier".to_string(),
        created_at: Utc::now(),
    };
    db.operators().insert(&operator).await.unwrap();
    operator.id
}

pub async fn seed_product(db: &Database, name: &str, price_cents: i64, on_hand: i64) -> String {
    let now = Utc::now();
    let product = Product {
        id: generate_id(),
        name: name.to_string(),
        price_cents,
        quantity_on_hand: on_hand,
        category_id: None,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.unwrap();
    product.id
}

pub async fn seed_customer(db: &Database, name: &str) -> String {
    let customer = Customer {
        id: generate_id(),
        name: name.to_string(),
        phone: None,
        created_at: Utc::now(),
    };
    db.customers().insert(&customer).await.unwrap();
    customer.id
}
