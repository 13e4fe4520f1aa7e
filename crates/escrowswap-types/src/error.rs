//! Error types for the EscrowSwap ledger and order book.
//!
//! All errors use the `ES_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order errors
//! - 2xx: Balance errors
//! - 3xx: Custody (token transfer) errors
//! - 6xx: Invariant / audit errors
//! - 9xx: General / internal errors
//!
//! Every error is reported synchronously and leaves ledger, book and
//! counter state exactly as it was before the failing call.

use thiserror::Error;

use crate::{AccountId, Amount, OrderId, OrderStatus, TokenId};

/// Central error enum for all EscrowSwap operations.
#[derive(Debug, Error)]
pub enum EscrowswapError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// No order was ever issued with this ID.
    #[error("ES_ERR_100: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order was already fulfilled or cancelled.
    #[error("ES_ERR_101: Order {id} is not active (status {status})")]
    OrderNotActive { id: OrderId, status: OrderStatus },

    /// Only the seller may cancel an order.
    #[error("ES_ERR_102: Account {caller} is not the owner of {id}")]
    NotOrderOwner { id: OrderId, caller: AccountId },

    /// The seller tried to fulfill their own order while self-trades are rejected.
    #[error("ES_ERR_103: Self-trade prevented on {0}: buyer is the seller")]
    SelfTradeBlocked(OrderId),

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// Amounts must be strictly positive.
    #[error("ES_ERR_200: Amount must be greater than 0")]
    InvalidAmount,

    /// Not enough spendable balance to perform the operation.
    #[error("ES_ERR_201: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    /// A credit would exceed the representable amount.
    #[error("ES_ERR_202: Balance overflow")]
    BalanceOverflow,

    // =================================================================
    // Custody Errors (3xx)
    // =================================================================
    /// The external token collaborator refused to move funds.
    #[error("ES_ERR_300: Token transfer failed for {token}: {reason}")]
    TransferFailed { token: TokenId, reason: String },

    // =================================================================
    // Invariant Errors (6xx)
    // =================================================================
    /// Supply conservation invariant violated. Critical safety alert.
    #[error("ES_ERR_600: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    /// A journal entry does not match its hash or its predecessor.
    #[error("ES_ERR_601: Journal corrupted at entry {sequence}: {reason}")]
    JournalCorrupted { sequence: u64, reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Serialization / deserialization error.
    #[error("ES_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config document, out-of-range values).
    #[error("ES_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, EscrowswapError>;

impl From<serde_json::Error> for EscrowswapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
