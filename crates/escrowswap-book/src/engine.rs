//! The swap engine: one owned state object for ledger, book and journal.
//!
//! [`SwapEngine`] is the single entry point for callers. Each public
//! operation either completes and journals exactly one event, or fails and
//! leaves balances, orders, the id counter and the journal untouched.
//!
//! [`SharedSwapEngine`] puts the engine behind one `parking_lot::Mutex`.
//! Every call holds the lock for its whole duration, so operations from
//! different threads are linearizable and never observe each other
//! mid-mutation. Custody implementations must not call back into the
//! shared engine from inside a transfer; the lock is not reentrant.

use std::sync::Arc;

use escrowswap_ledger::{BalanceLedger, TokenCustody};
use escrowswap_types::{
    constants, AccountId, Amount, EngineConfig, Order, OrderId, OrderTerms, Result, SwapEvent,
    TokenId,
};
use parking_lot::Mutex;

use crate::journal::{EventJournal, JournalEntry};
use crate::order_book::OrderBook;

/// Ledger + order book + journal + custody, owned together.
#[derive(Debug)]
pub struct SwapEngine<C> {
    ledger: BalanceLedger,
    book: OrderBook,
    journal: EventJournal,
    custody: C,
    config: EngineConfig,
}

impl<C: TokenCustody> SwapEngine<C> {
    /// Create an engine around `custody`.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` is invalid.
    pub fn new(custody: C, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::start(custody, config))
    }

    /// Create an engine with [`EngineConfig::default`].
    #[must_use]
    pub fn with_defaults(custody: C) -> Self {
        Self::start(custody, EngineConfig::default())
    }

    fn start(custody: C, config: EngineConfig) -> Self {
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            self_trade = ?config.self_trade,
            journal_capacity = config.journal_capacity,
            "Swap engine started"
        );
        Self {
            ledger: BalanceLedger::new(),
            book: OrderBook::new(config.self_trade),
            journal: EventJournal::new(config.journal_capacity),
            custody,
            config,
        }
    }

    // -----------------------------------------------------------------
    // Ledger operations
    // -----------------------------------------------------------------

    /// Pull `amount` of `token` from `caller` into custody and credit it.
    pub fn deposit(&mut self, caller: AccountId, token: &TokenId, amount: Amount) -> Result<()> {
        let event = self
            .ledger
            .deposit(&mut self.custody, caller, token, amount)?;
        self.journal.append(event);
        Ok(())
    }

    /// Debit `amount` of `token` from `caller` and push it out of custody.
    pub fn withdraw(&mut self, caller: AccountId, token: &TokenId, amount: Amount) -> Result<()> {
        let event = self
            .ledger
            .withdraw(&mut self.custody, caller, token, amount)?;
        self.journal.append(event);
        Ok(())
    }

    /// Spendable balance of `owner` in `token`.
    #[must_use]
    pub fn balance_of(&self, owner: AccountId, token: &TokenId) -> Amount {
        self.ledger.balance_of(owner, token)
    }

    // -----------------------------------------------------------------
    // Order operations
    // -----------------------------------------------------------------

    /// Escrow the sell leg from `seller` and open a new order.
    pub fn create_order(&mut self, seller: AccountId, terms: OrderTerms) -> Result<OrderId> {
        let (order_id, event) = self.book.create_order(&mut self.ledger, seller, terms)?;
        self.journal.append(event);
        Ok(order_id)
    }

    /// Cancel an active order owned by `caller`, returning its escrow.
    pub fn cancel_order(&mut self, caller: AccountId, order_id: OrderId) -> Result<()> {
        let event = self.book.cancel_order(&mut self.ledger, caller, order_id)?;
        self.journal.append(event);
        Ok(())
    }

    /// Fulfill an active order as `buyer`.
    pub fn fulfill_order(&mut self, buyer: AccountId, order_id: OrderId) -> Result<()> {
        let event = self.book.fulfill_order(&mut self.ledger, buyer, order_id)?;
        self.journal.append(event);
        Ok(())
    }

    /// Look up an order, active or closed.
    pub fn get_order(&self, order_id: OrderId) -> Result<&Order> {
        self.book.get_order(order_id)
    }

    // -----------------------------------------------------------------
    // Audit
    // -----------------------------------------------------------------

    /// Check `Σ balances + Σ escrow == deposited − withdrawn` for `token`.
    pub fn verify_conservation(&self, token: &TokenId) -> Result<()> {
        self.ledger.verify_supply(token, self.book.escrowed(token))
    }

    /// Check conservation for every token ever deposited or withdrawn.
    pub fn verify_all(&self) -> Result<()> {
        for token in self.ledger.supply().tracked_tokens() {
            self.verify_conservation(&token)?;
        }
        Ok(())
    }

    /// Remove journaled entries and return their events, oldest first.
    pub fn drain_events(&mut self) -> Vec<SwapEvent> {
        self.journal
            .drain()
            .into_iter()
            .map(|entry| entry.event)
            .collect()
    }

    #[must_use]
    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    #[must_use]
    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    #[must_use]
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn custody(&self) -> &C {
        &self.custody
    }

    /// Mutable access to the token collaborator (minting, approvals).
    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }
}

/// Thread-safe handle to a [`SwapEngine`]. Cloning shares the same engine.
#[derive(Debug)]
pub struct SharedSwapEngine<C> {
    inner: Arc<Mutex<SwapEngine<C>>>,
}

impl<C> Clone for SharedSwapEngine<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: TokenCustody> SharedSwapEngine<C> {
    #[must_use]
    pub fn new(engine: SwapEngine<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn deposit(&self, caller: AccountId, token: &TokenId, amount: Amount) -> Result<()> {
        self.inner.lock().deposit(caller, token, amount)
    }

    pub fn withdraw(&self, caller: AccountId, token: &TokenId, amount: Amount) -> Result<()> {
        self.inner.lock().withdraw(caller, token, amount)
    }

    #[must_use]
    pub fn balance_of(&self, owner: AccountId, token: &TokenId) -> Amount {
        self.inner.lock().balance_of(owner, token)
    }

    pub fn create_order(&self, seller: AccountId, terms: OrderTerms) -> Result<OrderId> {
        self.inner.lock().create_order(seller, terms)
    }

    pub fn cancel_order(&self, caller: AccountId, order_id: OrderId) -> Result<()> {
        self.inner.lock().cancel_order(caller, order_id)
    }

    pub fn fulfill_order(&self, buyer: AccountId, order_id: OrderId) -> Result<()> {
        self.inner.lock().fulfill_order(buyer, order_id)
    }

    /// Snapshot of an order at the time of the call.
    pub fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.inner.lock().get_order(order_id).cloned()
    }

    pub fn verify_all(&self) -> Result<()> {
        self.inner.lock().verify_all()
    }

    /// Snapshot of the retained journal entries.
    #[must_use]
    pub fn journal_entries(&self) -> Vec<JournalEntry> {
        self.inner.lock().journal().entries().cloned().collect()
    }

    /// Run `f` with exclusive access to the engine, as one atomic step.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut SwapEngine<C>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
