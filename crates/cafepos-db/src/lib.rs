//! # cafepos-db: Database Layer for the Café POS
//!
//! SQLite storage for the café POS, using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! cafepos-engine (StockLedger / TillManager / SaleEngine)
//!      │
//!      ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                cafepos-db (THIS CRATE)               │
//! │                                                      │
//! │   Database (pool.rs)   Repositories    Migrations    │
//! │   SqlitePool           products        (embedded)    │
//! │   WAL + FK on          customers                     │
//! │                        stock / till                  │
//! │                        sales / audit                 │
//! └──────────────────────────────────────────────────────┘
//!      │
//!      ▼
//! SQLite database file (one per café terminal installation)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cafepos_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/cafe.db")).await?;
//! let products = db.stock().list_with_categories().await?;
//! ```
//!
//! Repositories expose pool-level reads and simple writes; multi-write
//! workflows (sale persist, ledger adjust) run in a transaction owned by
//! the engine, which passes the transaction connection down into the
//! `&mut SqliteConnection` functions each repository module provides.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::audit::AuditRepository;
pub use repository::customer::CustomerRepository;
pub use repository::operator::OperatorRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::StockRepository;
pub use repository::till::TillRepository;
