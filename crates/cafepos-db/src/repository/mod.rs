//! # Repository Implementations
//!
//! One repository per aggregate. Each holds a `SqlitePool` for pool-level
//! reads and single-statement writes; modules additionally export
//! `&mut SqliteConnection` functions for writes that must run inside a
//! caller-owned transaction (sale persist, ledger adjust).

pub mod audit;
pub mod customer;
pub mod operator;
pub mod product;
pub mod sale;
pub mod stock;
pub mod till;

use uuid::Uuid;

/// Generates a new UUID v4 row id.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
