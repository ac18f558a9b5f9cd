//! # cafepos-core: Pure Business Logic for the Café POS
//!
//! This crate is the heart of the café point-of-sale. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Interactive terminal boundary (external)                   │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  cafepos-engine: StockLedger / TillManager / SaleEngine     │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ★ cafepos-core (THIS CRATE) ★                              │
//! │    money │ types │ cart │ validation │ error                │
//! │    NO I/O • NO DATABASE • PURE FUNCTIONS                    │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  cafepos-db: SQLite queries, migrations, repositories       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output
//! 2. **No I/O**: database and network access is forbidden here
//! 3. **Integer money**: all monetary values are cents (i64), never floats
//! 4. **Explicit errors**: typed error enums, never strings or panics

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine, PricingSummary};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum discount in basis points (1000 bps = 10%).
///
/// Requests above this are silently clamped down to exactly this value;
/// the applied percentage is what pricing results report.
pub const MAX_DISCOUNT_BPS: u32 = 1_000;

/// Maximum distinct products in a single sale.
///
/// Prevents runaway carts; a café order never legitimately reaches this.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single product per line.
///
/// Guards against typos (1000 instead of 10) at the boundary.
pub const MAX_LINE_QUANTITY: i64 = 999;
