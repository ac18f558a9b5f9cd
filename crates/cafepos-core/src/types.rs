//! # Domain Types
//!
//! Core domain types for the café POS.
//!
//! ## Entity Map
//! ```text
//! Sale 1──* SaleLineItem *──1 Product *──1 Category (optional)
//!   │                           ▲
//!   *──1 TillSession            │
//!   *──1 Operator        StockMovement (append-only audit trail)
//!   *──1 Customer (optional)
//! ```
//!
//! Ownership: the Sale Transaction Engine creates `Sale`/`SaleLineItem`;
//! the Stock Ledger creates `StockMovement` and is the only mutator of
//! `Product::quantity_on_hand`; the Till Manager owns `TillSession` state
//! transitions.
//!
//! Monetary fields are stored as integer cents (`*_cents`) with [`Money`]
//! accessors; timestamps are `chrono::DateTime<Utc>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the café catalogue.
///
/// `quantity_on_hand` never goes negative: the Stock Ledger rejects any
/// outbound adjustment that would make it so.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown at the terminal and on receipts.
    pub name: String,

    /// Unit price in cents. Non-negative.
    pub price_cents: i64,

    /// Current stock level. Mutated by the Stock Ledger only.
    pub quantity_on_hand: i64,

    /// Optional category reference.
    pub category_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money value.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether the product can be offered for sale at all.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.quantity_on_hand > 0
    }
}

// =============================================================================
// Customer / Operator
// =============================================================================

/// A registered customer. Sales may optionally reference one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A staff member operating the terminal.
///
/// Authentication is an external collaborator; the core only consumes the
/// operator id it supplies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Operator {
    pub id: String,
    pub display_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Stock Movements
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    /// Inbound: restock, correction upward.
    In,
    /// Outbound: sale, spoilage, correction downward.
    Out,
}

impl fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementDirection::In => f.write_str("in"),
            MovementDirection::Out => f.write_str("out"),
        }
    }
}

/// One row of the append-only stock movement history.
///
/// Exactly one row is written per successful ledger adjustment; rows are
/// never updated or deleted. The history reconciles against
/// `Product::quantity_on_hand`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    pub direction: MovementDirection,
    /// Always positive; the direction carries the sign.
    pub quantity: i64,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Till Sessions
// =============================================================================

/// Lifecycle state of a till session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum TillStatus {
    Open,
    Closed,
}

/// A cash-register session: the bounded period during which one operator's
/// sales are grouped for reconciliation.
///
/// At most one `open` session exists per operator; the Till Manager
/// enforces this with a lookup before every insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TillSession {
    pub id: String,
    pub operator_id: String,
    pub status: TillStatus,
    pub opening_balance_cents: i64,
    /// Declared by the operator at close; None while open or force-closed.
    pub closing_balance_cents: Option<i64>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl TillSession {
    #[inline]
    pub fn opening_balance(&self) -> Money {
        Money::from_cents(self.opening_balance_cents)
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == TillStatus::Open
    }
}

// =============================================================================
// Sales
// =============================================================================

/// A completed sale. Immutable once created: there is no edit or void
/// operation in this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// A sale cannot exist without the open till session it was rung on.
    pub till_session_id: String,
    pub customer_id: Option<String>,
    pub operator_id: String,
    pub gross_cents: i64,
    pub discount_cents: i64,
    pub net_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn gross(&self) -> Money {
        Money::from_cents(self.gross_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn net(&self) -> Money {
        Money::from_cents(self.net_cents)
    }
}

/// One product-quantity pair within a sale.
///
/// `unit_price_cents` is the price at the time of sale, decoupled from the
/// product's current price for historical fidelity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLineItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Read Projections
// =============================================================================

/// One line of the stock overview: product joined with its category name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockListEntry {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity_on_hand: i64,
    pub category_name: Option<String>,
}

/// One line of the movement history: movement joined with its product name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MovementHistoryEntry {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub direction: MovementDirection,
    pub quantity: i64,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_display() {
        assert_eq!(MovementDirection::In.to_string(), "in");
        assert_eq!(MovementDirection::Out.to_string(), "out");
    }

    #[test]
    fn test_direction_serde_names() {
        assert_eq!(serde_json::to_string(&MovementDirection::Out).unwrap(), "\"out\"");
        assert_eq!(serde_json::to_string(&TillStatus::Open).unwrap(), "\"open\"");
    }

    #[test]
    fn test_product_in_stock() {
        let now = Utc::now();
        let mut product = Product {
            id: "p1".into(),
            name: "Espresso".into(),
            price_cents: 350,
            quantity_on_hand: 1,
            category_id: None,
            created_at: now,
            updated_at: now,
        };
        assert!(product.in_stock());

        product.quantity_on_hand = 0;
        assert!(!product.in_stock());
    }
}
