//! The order book.
//!
//! Each order escrows its `amount_sell` out of the seller's ledger balance
//! at creation. Fulfilment and cancellation are the only ways an order
//! leaves `Active`, and each happens at most once.
//!
//! Every operation validates its preconditions before touching the ledger.
//! Multi-leg transfers are replayed by [`check_legs`] on scratch balances,
//! then applied through [`apply_legs`], which still reverts the legs already
//! applied if a later one fails. A caller only ever observes the full swap
//! or none of it.

use std::collections::{BTreeMap, HashMap};

use escrowswap_ledger::BalanceLedger;
use escrowswap_types::{
    constants, AccountId, Amount, EscrowswapError, Order, OrderId, OrderTerms, Result,
    SelfTradePolicy, SwapEvent, TokenId,
};

/// Direction of a single ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LegKind {
    Debit,
    Credit,
}

/// One ledger movement within an order operation.
#[derive(Debug, Clone)]
struct Leg<'a> {
    kind: LegKind,
    account: AccountId,
    token: &'a TokenId,
    amount: Amount,
}

impl<'a> Leg<'a> {
    fn debit(account: AccountId, token: &'a TokenId, amount: Amount) -> Self {
        Self {
            kind: LegKind::Debit,
            account,
            token,
            amount,
        }
    }

    fn credit(account: AccountId, token: &'a TokenId, amount: Amount) -> Self {
        Self {
            kind: LegKind::Credit,
            account,
            token,
            amount,
        }
    }

    fn apply(&self, ledger: &mut BalanceLedger) -> Result<()> {
        match self.kind {
            LegKind::Debit => ledger.debit(self.account, self.token, self.amount),
            LegKind::Credit => ledger.credit(self.account, self.token, self.amount),
        }
    }

    fn revert(&self, ledger: &mut BalanceLedger) -> Result<()> {
        match self.kind {
            LegKind::Debit => ledger.credit(self.account, self.token, self.amount),
            LegKind::Credit => ledger.debit(self.account, self.token, self.amount),
        }
    }
}

/// Replay `legs` against a scratch copy of the touched balances and fail
/// exactly where [`apply_legs`] would, without mutating the ledger.
///
/// Later legs see the effect of earlier ones, so a self-trade debit and
/// credit on the same balance net out.
fn check_legs(ledger: &BalanceLedger, legs: &[Leg<'_>]) -> Result<()> {
    let mut scratch: HashMap<(AccountId, &TokenId), Amount> = HashMap::new();
    for leg in legs {
        let balance = scratch
            .entry((leg.account, leg.token))
            .or_insert_with(|| ledger.balance_of(leg.account, leg.token));
        *balance = match leg.kind {
            LegKind::Debit => balance.checked_sub(leg.amount).ok_or(
                EscrowswapError::InsufficientBalance {
                    needed: leg.amount,
                    available: *balance,
                },
            )?,
            LegKind::Credit => balance
                .checked_add(leg.amount)
                .ok_or(EscrowswapError::BalanceOverflow)?,
        };
    }
    Ok(())
}

/// Apply `legs` in order. Callers run [`check_legs`] first. On the first
/// failure, revert the applied legs in reverse order and return that failure.
fn apply_legs(ledger: &mut BalanceLedger, legs: &[Leg<'_>]) -> Result<()> {
    for (applied, leg) in legs.iter().enumerate() {
        if let Err(err) = leg.apply(ledger) {
            for done in legs[..applied].iter().rev() {
                if let Err(revert_err) = done.revert(ledger) {
                    tracing::error!(
                        account = %done.account,
                        token = %done.token,
                        amount = done.amount,
                        error = %revert_err,
                        "Failed to revert ledger leg"
                    );
                }
            }
            return Err(err);
        }
    }
    Ok(())
}

/// Order records plus the id counter.
#[derive(Debug)]
pub struct OrderBook {
    /// Every order ever issued, keyed by id. Closed orders are retained.
    orders: BTreeMap<OrderId, Order>,
    /// Id handed to the next successful `create_order`.
    next_id: OrderId,
    /// Whether sellers may fulfill their own orders.
    self_trade: SelfTradePolicy,
}

impl OrderBook {
    /// Create an empty book. The first order gets id 0.
    #[must_use]
    pub fn new(self_trade: SelfTradePolicy) -> Self {
        Self {
            orders: BTreeMap::new(),
            next_id: OrderId(constants::FIRST_ORDER_ID),
            self_trade,
        }
    }

    /// Escrow `terms.amount_sell` from `seller` and record a new active order.
    ///
    /// The id is allocated only after the escrow debit succeeds, so failed
    /// creates never consume an id.
    ///
    /// # Errors
    /// - `InvalidAmount` if either amount is zero
    /// - `InsufficientBalance` if the seller cannot cover `amount_sell`
    pub fn create_order(
        &mut self,
        ledger: &mut BalanceLedger,
        seller: AccountId,
        terms: OrderTerms,
    ) -> Result<(OrderId, SwapEvent)> {
        terms.validate()?;
        ledger.debit(seller, &terms.token_sell, terms.amount_sell)?;

        let id = self.next_id;
        self.next_id = id.next();

        let order = Order::open(id, seller, terms);
        let event = SwapEvent::OrderCreated {
            order_id: id,
            seller,
            token_sell: order.token_sell.clone(),
            amount_sell: order.amount_sell,
            token_buy: order.token_buy.clone(),
            amount_buy: order.amount_buy,
        };

        tracing::info!(
            order_id = %id,
            seller = %seller,
            token_sell = %order.token_sell,
            amount_sell = order.amount_sell,
            token_buy = %order.token_buy,
            amount_buy = order.amount_buy,
            "Order created"
        );

        self.orders.insert(id, order);
        Ok((id, event))
    }

    /// Return the escrow of `order_id` to its seller and close the order.
    ///
    /// # Errors
    /// - `OrderNotFound` if the id was never issued
    /// - `NotOrderOwner` if `caller` is not the seller
    /// - `OrderNotActive` if the order was already fulfilled or cancelled
    pub fn cancel_order(
        &mut self,
        ledger: &mut BalanceLedger,
        caller: AccountId,
        order_id: OrderId,
    ) -> Result<SwapEvent> {
        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(EscrowswapError::OrderNotFound(order_id))?;

        if order.seller != caller {
            return Err(EscrowswapError::NotOrderOwner {
                id: order_id,
                caller,
            });
        }
        if !order.is_active() {
            return Err(EscrowswapError::OrderNotActive {
                id: order_id,
                status: order.status,
            });
        }

        ledger.credit(order.seller, &order.token_sell, order.amount_sell)?;
        order.mark_cancelled()?;

        tracing::info!(order_id = %order_id, seller = %caller, "Order cancelled");
        Ok(SwapEvent::OrderCancelled { order_id })
    }

    /// Execute the swap: `buyer` pays `amount_buy` to the seller and
    /// receives the escrowed `amount_sell`.
    ///
    /// # Errors
    /// - `OrderNotFound` if the id was never issued
    /// - `OrderNotActive` if the order was already fulfilled or cancelled
    /// - `SelfTradeBlocked` if `buyer` is the seller and self-trades are rejected
    /// - `InsufficientBalance` if `buyer` cannot cover `amount_buy`
    /// - `BalanceOverflow` if a credited balance would not fit
    pub fn fulfill_order(
        &mut self,
        ledger: &mut BalanceLedger,
        buyer: AccountId,
        order_id: OrderId,
    ) -> Result<SwapEvent> {
        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(EscrowswapError::OrderNotFound(order_id))?;

        if !order.is_active() {
            return Err(EscrowswapError::OrderNotActive {
                id: order_id,
                status: order.status,
            });
        }
        if buyer == order.seller && self.self_trade == SelfTradePolicy::Reject {
            tracing::warn!(
                order_id = %order_id,
                account = %buyer,
                "Self-trade blocked: buyer is the seller"
            );
            return Err(EscrowswapError::SelfTradeBlocked(order_id));
        }

        let legs = [
            Leg::debit(buyer, &order.token_buy, order.amount_buy),
            Leg::credit(order.seller, &order.token_buy, order.amount_buy),
            Leg::credit(buyer, &order.token_sell, order.amount_sell),
        ];
        check_legs(ledger, &legs)?;
        apply_legs(ledger, &legs)?;
        order.mark_fulfilled(buyer)?;

        tracing::info!(
            order_id = %order_id,
            seller = %order.seller,
            buyer = %buyer,
            "Order fulfilled"
        );
        Ok(SwapEvent::OrderFulfilled { order_id, buyer })
    }

    /// Look up an order, active or closed.
    ///
    /// # Errors
    /// Returns `OrderNotFound` if the id was never issued.
    pub fn get_order(&self, order_id: OrderId) -> Result<&Order> {
        self.orders
            .get(&order_id)
            .ok_or(EscrowswapError::OrderNotFound(order_id))
    }

    /// Id the next successful `create_order` will assign.
    #[must_use]
    pub fn next_order_id(&self) -> OrderId {
        self.next_id
    }

    /// Active orders in id order.
    pub fn active_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values().filter(|o| o.is_active())
    }

    /// Every order ever created by `seller`, in id order.
    #[must_use]
    pub fn orders_by_seller(&self, seller: AccountId) -> Vec<&Order> {
        self.orders.values().filter(|o| o.seller == seller).collect()
    }

    /// Total `amount_sell` of `token` held in escrow by active orders.
    #[must_use]
    pub fn escrowed(&self, token: &TokenId) -> Amount {
        self.active_orders()
            .filter(|o| &o.token_sell == token)
            .map(|o| o.amount_sell)
            .fold(0, Amount::saturating_add)
    }

    /// Number of orders ever issued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new(SelfTradePolicy::default())
    }
}
