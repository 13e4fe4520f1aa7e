//! # escrowswap-types
//!
//! Shared types, errors, and configuration for the **EscrowSwap** ledger.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`TokenId`], [`OrderId`]
//! - **Balance model**: [`Amount`], [`BalanceEntry`]
//! - **Order model**: [`Order`], [`OrderTerms`], [`OrderStatus`]
//! - **Event model**: [`SwapEvent`]
//! - **Configuration**: [`EngineConfig`], [`SelfTradePolicy`]
//! - **Errors**: [`EscrowswapError`] with `ES_ERR_` prefix codes
//! - **Constants**: system-wide defaults

pub mod balance;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod order;

// Re-export all primary types at crate root for ergonomic imports:
//   use escrowswap_types::{Order, OrderId, SwapEvent, ...};

pub use balance::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use order::*;

// Constants are accessed via `escrowswap_types::constants::FOO`
// (not re-exported to avoid name collisions).
