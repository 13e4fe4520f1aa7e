//! Events emitted by successful ledger and order-book operations.
//!
//! Failed operations emit nothing.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, OrderId, TokenId};

/// A state change observable by callers and auditors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapEvent {
    /// Tokens were pulled into custody and credited to `owner`.
    TokensDeposited {
        owner: AccountId,
        token: TokenId,
        amount: Amount,
    },
    /// Tokens were debited from `owner` and pushed out of custody.
    TokensWithdrawn {
        owner: AccountId,
        token: TokenId,
        amount: Amount,
    },
    /// A new order escrowed `amount_sell` of `token_sell`.
    OrderCreated {
        order_id: OrderId,
        seller: AccountId,
        token_sell: TokenId,
        amount_sell: Amount,
        token_buy: TokenId,
        amount_buy: Amount,
    },
    /// The seller cancelled; escrow returned.
    OrderCancelled { order_id: OrderId },
    /// `buyer` completed the swap.
    OrderFulfilled { order_id: OrderId, buyer: AccountId },
}

impl SwapEvent {
    /// Stable upper-case event name, used in logs and journal digests.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TokensDeposited { .. } => "TOKENS_DEPOSITED",
            Self::TokensWithdrawn { .. } => "TOKENS_WITHDRAWN",
            Self::OrderCreated { .. } => "ORDER_CREATED",
            Self::OrderCancelled { .. } => "ORDER_CANCELLED",
            Self::OrderFulfilled { .. } => "ORDER_FULFILLED",
        }
    }

    /// The order this event refers to, if any.
    #[must_use]
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            Self::OrderCreated { order_id, .. }
            | Self::OrderCancelled { order_id }
            | Self::OrderFulfilled { order_id, .. } => Some(*order_id),
            Self::TokensDeposited { .. } | Self::TokensWithdrawn { .. } => None,
        }
    }
}

impl std::fmt::Display for SwapEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokensDeposited { owner, token, amount }
            | Self::TokensWithdrawn { owner, token, amount } => {
                write!(f, "{} {owner} {amount} {token}", self.kind())
            }
            Self::OrderCreated {
                order_id,
                seller,
                token_sell,
                amount_sell,
                token_buy,
                amount_buy,
            } => write!(
                f,
                "{} {order_id} {seller} {amount_sell} {token_sell} -> {amount_buy} {token_buy}",
                self.kind()
            ),
            Self::OrderCancelled { order_id } => write!(f, "{} {order_id}", self.kind()),
            Self::OrderFulfilled { order_id, buyer } => {
                write!(f, "{} {order_id} by {buyer}", self.kind())
            }
        }
    }
}
