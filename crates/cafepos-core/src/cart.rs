//! # Cart and Pricing
//!
//! Pure cart math for a sale in progress: line collection with prices
//! captured at selection time, and the gross → discount → net pricing
//! step with the 10% discount cap.
//!
//! The cart knows nothing about live stock; the engine re-checks on-hand
//! quantities against fresh reads before lines get here.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::{MAX_CART_LINES, MAX_DISCOUNT_BPS, MAX_LINE_QUANTITY};

/// A product-quantity pair in the cart.
///
/// ## Price Freezing
/// `unit_price_cents` is captured when the line is added. If the catalogue
/// price changes before the sale is confirmed, this line keeps the price
/// the customer was quoted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    /// Name at time of adding, for the receipt.
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    /// Line total: unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// The cart for a single sale in progress.
///
/// ## Invariants
/// - Lines are unique by product id; adding the same product again merges
///   into one line (one `SaleLineItem` row per distinct product).
/// - Quantities are positive and capped at [`MAX_LINE_QUANTITY`].
/// - At most [`MAX_CART_LINES`] distinct products.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity of the given product already in the cart (0 if absent).
    ///
    /// Callers use this to check the merged quantity against live stock
    /// before adding more of the same product.
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Adds a product to the cart, merging with an existing line for the
    /// same product.
    ///
    /// The price is frozen from `product` at this moment.
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let merged = line.quantity + quantity;
            if merged > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = merged;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge { max: MAX_CART_LINES });
        }

        self.lines.push(CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
        });
        Ok(())
    }

    /// Gross total: Σ(unit price at selection time × quantity).
    pub fn gross(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Prices the cart with an optional requested discount percentage (in
    /// basis points).
    ///
    /// Requests above [`MAX_DISCOUNT_BPS`] are clamped down to exactly the
    /// cap — not rejected — and the summary reports the applied value, not
    /// the requested one.
    ///
    /// Fails with [`CoreError::EmptyCart`] when there is nothing to price.
    pub fn price(&self, requested_discount_bps: u32) -> CoreResult<PricingSummary> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let applied_bps = requested_discount_bps.min(MAX_DISCOUNT_BPS);
        let gross = self.gross();
        let discount = gross.percentage_of(applied_bps);

        Ok(PricingSummary {
            gross,
            discount_bps: applied_bps,
            discount,
            net: gross - discount,
        })
    }
}

/// The priced totals of a cart, ready for operator review.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricingSummary {
    pub gross: Money,
    /// The discount actually applied, after clamping.
    pub discount_bps: u32,
    pub discount: Money,
    pub net: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
