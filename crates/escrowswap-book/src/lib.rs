//! # escrowswap-book
//!
//! **Order Book**: fixed-price bilateral swap orders backed by escrow in
//! the [`BalanceLedger`](escrowswap_ledger::BalanceLedger).
//!
//! ## Architecture
//!
//! 1. **OrderBook**: order records, the id counter, and the transfer
//!    choreography for create / cancel / fulfill
//! 2. **EventJournal**: hash-chained log of every emitted [`SwapEvent`](escrowswap_types::SwapEvent)
//! 3. **SwapEngine**: owns ledger, book, journal and custody; the single
//!    entry point for callers
//! 4. **SharedSwapEngine**: `SwapEngine` behind one mutex, so every public
//!    operation is linearizable across threads
//!
//! ## Order Flow
//!
//! ```text
//! create:  ledger.debit(seller, sell)                       → ACTIVE
//! cancel:  ledger.credit(seller, sell)                      → CANCELLED
//! fulfill: ledger.debit(buyer, buy) → credit(seller, buy)
//!          → credit(buyer, sell)                            → FULFILLED
//! ```

pub mod engine;
pub mod journal;
pub mod order_book;
#[cfg(test)]
mod test_support;

pub use engine::{SharedSwapEngine, SwapEngine};
pub use journal::{EventJournal, JournalEntry};
pub use order_book::OrderBook;
