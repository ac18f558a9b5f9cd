//! # Sale Transaction Engine
//!
//! Orchestrates a sale from till precondition to persisted receipt.
//!
//! ## Sale Lifecycle
//! ```text
//! AwaitingTill     begin()          open till required, else NoOpenTill
//!      │
//! CollectingItems  add_line()*      fresh stock read per call
//!      │
//! PricingReview    price()          EmptyCart check, discount clamped ≤10%
//!      │
//! Confirmed        commit()         calling commit IS the confirmation;
//!      │                            declining = dropping the PricedSale,
//!      │                            which writes nothing
//! Persisted        → Receipt        one transaction:
//!                                     sale header
//!                                     N line items
//!                                     N conditional stock decrements
//!                                     N movement rows (reason "sale")
//! ```
//!
//! Writes only begin at commit. If any line's decrement fails there
//! (stock changed between selection and confirmation), the transaction
//! rolls back: no sale header, no line items, no stock mutation from any
//! already-processed line remains visible.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use cafepos_core::{
    validation, Cart, CartLine, CoreError, Money, MovementDirection, PricingSummary, Sale,
    SaleLineItem, StockMovement,
};
use cafepos_db::repository::{generate_id, sale as sale_repo, stock, till as till_repo};
use cafepos_db::{Database, DbError};

use crate::audit;
use crate::error::EngineResult;

/// The sale transaction engine.
#[derive(Debug, Clone)]
pub struct SaleEngine {
    db: Database,
}

/// A sale in the `CollectingItems` state: bound to an open till session,
/// accumulating cart lines.
#[derive(Debug, Clone)]
pub struct SaleDraft {
    till_session_id: String,
    operator_id: String,
    customer_id: Option<String>,
    cart: Cart,
}

impl SaleDraft {
    /// Lines collected so far.
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// Gross total of the lines collected so far.
    pub fn gross(&self) -> Money {
        self.cart.gross()
    }

    /// The till session this sale will be rung on.
    pub fn till_session_id(&self) -> &str {
        &self.till_session_id
    }
}

/// A sale in the `PricingReview` state: totals fixed, awaiting explicit
/// confirmation. Dropping it aborts the sale with no writes.
#[derive(Debug, Clone)]
pub struct PricedSale {
    draft: SaleDraft,
    pricing: PricingSummary,
}

impl PricedSale {
    /// The priced totals, with the applied (clamped) discount.
    pub fn pricing(&self) -> &PricingSummary {
        &self.pricing
    }

    /// Lines that will be persisted on confirmation.
    pub fn lines(&self) -> &[CartLine] {
        self.draft.lines()
    }
}

/// One line of a receipt, with its computed subtotal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// The receipt for a persisted sale, ready for the boundary to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub sale_id: String,
    pub created_at: chrono::DateTime<Utc>,
    pub lines: Vec<ReceiptLine>,
    pub gross: Money,
    /// The discount actually applied, after clamping.
    pub discount_bps: u32,
    pub discount: Money,
    pub net: Money,
}

impl SaleEngine {
    /// Creates a sale engine over the given database handle.
    pub fn new(db: Database) -> Self {
        SaleEngine { db }
    }

    /// `AwaitingTill` → `CollectingItems`.
    ///
    /// Requires an open till session for the operator; absence aborts the
    /// whole sale with `NoOpenTill` before anything else happens. A
    /// customer reference, when given, must resolve.
    pub async fn begin(
        &self,
        operator_id: &str,
        customer_id: Option<&str>,
    ) -> EngineResult<SaleDraft> {
        let session = self
            .db
            .tills()
            .find_open(operator_id)
            .await?
            .ok_or_else(|| CoreError::NoOpenTill {
                operator_id: operator_id.to_string(),
            })?;

        if let Some(id) = customer_id {
            self.db
                .customers()
                .get_by_id(id)
                .await?
                .ok_or_else(|| CoreError::not_found("customer", id))?;
        }

        debug!(operator_id, till_session_id = %session.id, "sale started");

        Ok(SaleDraft {
            till_session_id: session.id,
            operator_id: operator_id.to_string(),
            customer_id: customer_id.map(str::to_string),
            cart: Cart::new(),
        })
    }

    /// Adds a (product, quantity) pair to the draft.
    ///
    /// The stock check runs against a fresh read, not a cached snapshot,
    /// and covers the merged quantity when the product is already in the
    /// cart. The unit price is captured from this read.
    pub async fn add_line(
        &self,
        draft: &mut SaleDraft,
        product_id: &str,
        quantity: i64,
    ) -> EngineResult<()> {
        validation::validate_quantity(quantity).map_err(CoreError::from)?;

        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::not_found("product", product_id))?;

        let requested = draft.cart.quantity_of(product_id) + quantity;
        if requested > product.quantity_on_hand {
            return Err(CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                available: product.quantity_on_hand,
                requested,
            }
            .into());
        }

        draft.cart.add(&product, quantity).map_err(Into::into)
    }

    /// `CollectingItems` → `PricingReview`.
    ///
    /// Fails with `EmptyCart` on zero lines. A requested discount above
    /// 10% is clamped to exactly 10% - not rejected - and the returned
    /// pricing reports the applied value.
    pub fn price(
        &self,
        draft: SaleDraft,
        requested_discount_bps: u32,
    ) -> EngineResult<PricedSale> {
        let pricing = draft.cart.price(requested_discount_bps)?;
        Ok(PricedSale { draft, pricing })
    }

    /// `Confirmed` → `Persisted`.
    ///
    /// The four-way write (header, line items, stock decrements, movement
    /// rows) is one all-or-nothing transaction; see the module docs.
    pub async fn commit(&self, sale: PricedSale) -> EngineResult<Receipt> {
        let PricedSale { draft, pricing } = sale;
        let now = Utc::now();
        let sale_id = generate_id();

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        // The till may have closed between begin and confirmation; the
        // recheck runs under the same transaction as the writes.
        if !till_repo::is_open_in(&mut tx, &draft.till_session_id).await? {
            return Err(CoreError::NoOpenTill {
                operator_id: draft.operator_id.clone(),
            }
            .into());
        }

        let header = Sale {
            id: sale_id.clone(),
            till_session_id: draft.till_session_id.clone(),
            customer_id: draft.customer_id.clone(),
            operator_id: draft.operator_id.clone(),
            gross_cents: pricing.gross.cents(),
            discount_cents: pricing.discount.cents(),
            net_cents: pricing.net.cents(),
            created_at: now,
        };
        sale_repo::insert_sale(&mut tx, &header).await?;

        let mut lines = Vec::with_capacity(draft.cart.lines().len());
        for line in draft.cart.lines() {
            let item = SaleLineItem {
                id: generate_id(),
                sale_id: sale_id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.line_total().cents(),
                created_at: now,
            };
            sale_repo::insert_line_item(&mut tx, &item).await?;

            if stock::try_decrement(&mut tx, &line.product_id, line.quantity)
                .await?
                .is_none()
            {
                // Stock changed between selection and confirmation.
                // Dropping the transaction rolls back the header and every
                // line processed so far.
                let available = stock::on_hand_in(&mut tx, &line.product_id)
                    .await?
                    .unwrap_or(0);
                return Err(CoreError::InsufficientStock {
                    product_id: line.product_id.clone(),
                    available,
                    requested: line.quantity,
                }
                .into());
            }

            let movement = StockMovement {
                id: generate_id(),
                product_id: line.product_id.clone(),
                direction: MovementDirection::Out,
                quantity: line.quantity,
                reason: Some("sale".to_string()),
                created_at: now,
            };
            stock::insert_movement(&mut tx, &movement).await?;

            lines.push(ReceiptLine {
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price: Money::from_cents(line.unit_price_cents),
                line_total: line.line_total(),
            });
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            sale_id = %sale_id,
            net = %pricing.net,
            lines = lines.len(),
            "sale persisted"
        );

        audit::record_event(
            &self.db,
            &draft.operator_id,
            "sale_completed",
            json!({ "sale_id": sale_id, "net_cents": pricing.net.cents() }),
        )
        .await;

        Ok(Receipt {
            sale_id,
            created_at: now,
            lines,
            gross: pricing.gross,
            discount_bps: pricing.discount_bps,
            discount: pricing.discount,
            net: pricing.net,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
