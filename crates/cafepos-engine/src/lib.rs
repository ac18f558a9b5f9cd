//! # cafepos-engine: Sale, Till and Stock Orchestration
//!
//! The three tightly-coupled components of the café terminal workflow,
//! built on `cafepos-core` (pure logic) and `cafepos-db` (storage):
//!
//! - [`StockLedger`] owns product on-hand quantity and the append-only
//!   movement history; every adjustment is one transaction.
//! - [`TillManager`] owns the cash session lifecycle per operator.
//! - [`SaleEngine`] orchestrates a sale: open-till precondition, cart
//!   collection against live stock, capped discount, and the all-or-nothing
//!   persist that also drives the ledger.
//!
//! ## Control Flow
//! ```text
//! SaleEngine ──precondition──► TillManager (open session?)
//!     │
//!     └──persist──► sales + line items + StockLedger decrements
//!                   (one transaction; partial application is a rollback)
//!
//! TillManager.close ──reads──► sale net totals for the session
//! ```
//!
//! Every component receives the [`Database`](cafepos_db::Database) handle
//! at construction - acquired at process start, released at shutdown.

mod audit;
pub mod error;
pub mod ledger;
pub mod sale;
pub mod till;

pub use error::{EngineError, EngineResult};
pub use ledger::StockLedger;
pub use sale::{PricedSale, Receipt, ReceiptLine, SaleDraft, SaleEngine};
pub use till::{TillCloseSummary, TillManager};

#[cfg(test)]
mod testutil;
