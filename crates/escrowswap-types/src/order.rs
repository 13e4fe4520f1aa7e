//! Order types for the EscrowSwap order book.
//!
//! An order is a standing offer to swap a fixed `amount_sell` of one token
//! for a fixed `amount_buy` of another. It is filled whole or not at all.
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────┐  fulfill   ┌───────────┐
//!   │ ACTIVE ├───────────▶│ FULFILLED │
//!   └───┬────┘            └───────────┘
//!       │ cancel
//!       ▼
//!   ┌───────────┐
//!   │ CANCELLED │
//!   └───────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, EscrowswapError, OrderId, Result, TokenId};

/// Lifecycle status of an order.
///
/// Transitions are **monotonic**: both terminal states are reachable only
/// from `Active`, and nothing re-enters `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Escrow is held; the order can be fulfilled or cancelled.
    Active,
    /// A buyer paid `amount_buy` and received the escrow.
    Fulfilled,
    /// The seller withdrew the offer; escrow returned.
    Cancelled,
}

impl OrderStatus {
    /// Can this order transition to the given target status?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Active, Self::Fulfilled | Self::Cancelled))
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Fulfilled => write!(f, "FULFILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// The economic terms of an order, as submitted by the seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTerms {
    pub token_sell: TokenId,
    pub amount_sell: Amount,
    pub token_buy: TokenId,
    pub amount_buy: Amount,
}

impl OrderTerms {
    #[must_use]
    pub fn new(
        token_sell: impl Into<TokenId>,
        amount_sell: Amount,
        token_buy: impl Into<TokenId>,
        amount_buy: Amount,
    ) -> Self {
        Self {
            token_sell: token_sell.into(),
            amount_sell,
            token_buy: token_buy.into(),
            amount_buy,
        }
    }

    /// Both legs must move a positive amount.
    ///
    /// # Errors
    /// Returns `InvalidAmount` if either amount is zero.
    pub fn validate(&self) -> Result<()> {
        if self.amount_sell == 0 || self.amount_buy == 0 {
            return Err(EscrowswapError::InvalidAmount);
        }
        Ok(())
    }
}

/// A recorded order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub seller: AccountId,
    pub token_sell: TokenId,
    /// Held in escrow by the book while the order is active.
    pub amount_sell: Amount,
    pub token_buy: TokenId,
    pub amount_buy: Amount,
    pub status: OrderStatus,
    /// Set when the order is fulfilled.
    pub buyer: Option<AccountId>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Build a fresh active order from its terms.
    #[must_use]
    pub fn open(id: OrderId, seller: AccountId, terms: OrderTerms) -> Self {
        Self {
            id,
            seller,
            token_sell: terms.token_sell,
            amount_sell: terms.amount_sell,
            token_buy: terms.token_buy,
            amount_buy: terms.amount_buy,
            status: OrderStatus::Active,
            buyer: None,
            created_at: Utc::now(),
            closed_at: None,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    /// Mark the order as fulfilled by `buyer`.
    ///
    /// # Errors
    /// Returns `OrderNotActive` if the order already left `Active`.
    pub fn mark_fulfilled(&mut self, buyer: AccountId) -> Result<()> {
        self.transition(OrderStatus::Fulfilled)?;
        self.buyer = Some(buyer);
        Ok(())
    }

    /// Mark the order as cancelled.
    ///
    /// # Errors
    /// Returns `OrderNotActive` if the order already left `Active`.
    pub fn mark_cancelled(&mut self) -> Result<()> {
        self.transition(OrderStatus::Cancelled)
    }

    fn transition(&mut self, target: OrderStatus) -> Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(EscrowswapError::OrderNotActive {
                id: self.id,
                status: self.status,
            });
        }
        self.status = target;
        self.closed_at = Some(Utc::now());
        Ok(())
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy(id: u64, seller: AccountId) -> Self {
        Self::open(
            OrderId(id),
            seller,
            OrderTerms::new("WRZ", 50, "VGD", 25),
        )
    }
}
