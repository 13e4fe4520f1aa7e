//! End-to-end tests across custody, ledger and order book.
//!
//! Each test drives a [`SwapEngine`] the way an external caller would:
//! tokens are minted and approved in custody, deposited, traded through
//! orders, and withdrawn again.

use escrowswap_book::SwapEngine;
use escrowswap_ledger::InMemoryCustody;
use escrowswap_types::*;

const ONE_TOKEN: Amount = 1_000_000_000_000_000_000;

fn units(n: u128) -> Amount {
    n * ONE_TOKEN
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Two tokens, a seller holding WRZ and a buyer holding VGD, both with
/// 1000 tokens minted and approved for the ledger.
struct Market {
    engine: SwapEngine<InMemoryCustody>,
    warzone: TokenId,
    vanguard: TokenId,
    seller: AccountId,
    buyer: AccountId,
}

impl Market {
    fn new() -> Self {
        init_tracing();
        let warzone = TokenId::from("WRZ");
        let vanguard = TokenId::from("VGD");
        let seller = AccountId::new();
        let buyer = AccountId::new();

        let mut custody = InMemoryCustody::new();
        custody.mint(&warzone, seller, units(1000));
        custody.mint(&vanguard, buyer, units(1000));
        custody.approve(&warzone, seller, units(1000));
        custody.approve(&vanguard, buyer, units(1000));

        Self {
            engine: SwapEngine::with_defaults(custody),
            warzone,
            vanguard,
            seller,
            buyer,
        }
    }

    fn standard_terms(&self) -> OrderTerms {
        OrderTerms::new(
            self.warzone.clone(),
            units(50),
            self.vanguard.clone(),
            units(25),
        )
    }

    fn last_event(&self) -> SwapEvent {
        self.engine
            .journal()
            .entries()
            .last()
            .map(|e| e.event.clone())
            .expect("journal should not be empty")
    }
}

// =============================================================================
// Deposit and withdraw
// =============================================================================

#[test]
fn deposit_credits_and_emits() {
    let mut m = Market::new();
    m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap();

    assert_eq!(
        m.last_event(),
        SwapEvent::TokensDeposited {
            owner: m.seller,
            token: m.warzone.clone(),
            amount: units(100),
        }
    );
    assert_eq!(m.engine.balance_of(m.seller, &m.warzone), units(100));
    assert_eq!(m.engine.custody().vault_balance(&m.warzone), units(100));
}

#[test]
fn deposit_zero_rejected() {
    let mut m = Market::new();
    let err = m.engine.deposit(m.seller, &m.warzone, 0).unwrap_err();
    assert!(matches!(err, EscrowswapError::InvalidAmount));
    assert!(err.to_string().contains("Amount must be greater than 0"));
}

#[test]
fn deposit_without_allowance_fails_cleanly() {
    let mut m = Market::new();
    m.engine
        .custody_mut()
        .approve(&m.warzone, m.seller, units(10));

    let err = m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap_err();
    assert!(matches!(err, EscrowswapError::TransferFailed { .. }));
    assert_eq!(m.engine.balance_of(m.seller, &m.warzone), 0);
    assert_eq!(m.engine.custody().balance_of(&m.warzone, &m.seller), units(1000));
    assert!(m.engine.journal().is_empty());
}

#[test]
fn withdraw_returns_tokens_to_holder() {
    let mut m = Market::new();
    m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap();
    m.engine.withdraw(m.seller, &m.warzone, units(50)).unwrap();

    assert_eq!(
        m.last_event(),
        SwapEvent::TokensWithdrawn {
            owner: m.seller,
            token: m.warzone.clone(),
            amount: units(50),
        }
    );
    assert_eq!(m.engine.balance_of(m.seller, &m.warzone), units(50));
    assert_eq!(m.engine.custody().balance_of(&m.warzone, &m.seller), units(950));
}

#[test]
fn withdraw_more_than_available_fails() {
    let mut m = Market::new();
    m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap();

    let err = m.engine.withdraw(m.seller, &m.warzone, units(150)).unwrap_err();
    assert!(matches!(err, EscrowswapError::InsufficientBalance { .. }));
    assert_eq!(m.engine.balance_of(m.seller, &m.warzone), units(100));
}

#[test]
fn withdraw_cannot_touch_escrow() {
    let mut m = Market::new();
    m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap();
    m.engine.create_order(m.seller, m.standard_terms()).unwrap();

    let err = m.engine.withdraw(m.seller, &m.warzone, units(51)).unwrap_err();
    assert!(matches!(
        err,
        EscrowswapError::InsufficientBalance { available, .. } if available == units(50)
    ));
    m.engine.withdraw(m.seller, &m.warzone, units(50)).unwrap();
    m.engine.verify_all().unwrap();
}

// =============================================================================
// Order creation and cancellation
// =============================================================================

#[test]
fn create_order_records_all_fields() {
    let mut m = Market::new();
    m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap();

    let id = m.engine.create_order(m.seller, m.standard_terms()).unwrap();
    assert_eq!(id, OrderId(0));
    assert_eq!(
        m.last_event(),
        SwapEvent::OrderCreated {
            order_id: OrderId(0),
            seller: m.seller,
            token_sell: m.warzone.clone(),
            amount_sell: units(50),
            token_buy: m.vanguard.clone(),
            amount_buy: units(25),
        }
    );

    let order = m.engine.get_order(id).unwrap();
    assert_eq!(order.seller, m.seller);
    assert_eq!(order.token_sell, m.warzone);
    assert_eq!(order.amount_sell, units(50));
    assert_eq!(order.token_buy, m.vanguard);
    assert_eq!(order.amount_buy, units(25));
    assert!(order.is_active());
}

#[test]
fn insufficient_balance_does_not_consume_order_id() {
    let mut m = Market::new();
    m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap();

    let oversized = OrderTerms::new(m.warzone.clone(), units(1001), m.vanguard.clone(), units(25));
    let err = m.engine.create_order(m.seller, oversized).unwrap_err();
    assert!(matches!(err, EscrowswapError::InsufficientBalance { .. }));
    assert_eq!(m.engine.balance_of(m.seller, &m.warzone), units(100));

    let id = m.engine.create_order(m.seller, m.standard_terms()).unwrap();
    assert_eq!(id, OrderId(0));
}

#[test]
fn cancel_restores_seller_balance() {
    let mut m = Market::new();
    m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap();
    let id = m.engine.create_order(m.seller, m.standard_terms()).unwrap();
    assert_eq!(m.engine.balance_of(m.seller, &m.warzone), units(50));

    m.engine.cancel_order(m.seller, id).unwrap();
    assert_eq!(m.last_event(), SwapEvent::OrderCancelled { order_id: id });
    assert!(!m.engine.get_order(id).unwrap().is_active());
    assert_eq!(m.engine.balance_of(m.seller, &m.warzone), units(100));
}

#[test]
fn only_creator_may_cancel() {
    let mut m = Market::new();
    m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap();
    let id = m.engine.create_order(m.seller, m.standard_terms()).unwrap();

    let err = m.engine.cancel_order(m.buyer, id).unwrap_err();
    assert!(matches!(err, EscrowswapError::NotOrderOwner { .. }));
    assert!(m.engine.get_order(id).unwrap().is_active());
}

#[test]
fn unknown_order_is_not_found() {
    let mut m = Market::new();
    assert!(matches!(
        m.engine.get_order(OrderId(0)),
        Err(EscrowswapError::OrderNotFound(OrderId(0)))
    ));
    assert!(matches!(
        m.engine.fulfill_order(m.buyer, OrderId(0)),
        Err(EscrowswapError::OrderNotFound(_))
    ));
}

// =============================================================================
// Order fulfilment
// =============================================================================

#[test]
fn fulfill_swaps_balances() {
    let mut m = Market::new();
    m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap();
    m.engine.deposit(m.buyer, &m.vanguard, units(100)).unwrap();
    let id = m.engine.create_order(m.seller, m.standard_terms()).unwrap();

    m.engine.fulfill_order(m.buyer, id).unwrap();
    assert_eq!(
        m.last_event(),
        SwapEvent::OrderFulfilled {
            order_id: id,
            buyer: m.buyer
        }
    );

    let order = m.engine.get_order(id).unwrap();
    assert!(!order.is_active());
    assert_eq!(order.status, OrderStatus::Fulfilled);

    assert_eq!(m.engine.balance_of(m.seller, &m.warzone), units(50));
    assert_eq!(m.engine.balance_of(m.seller, &m.vanguard), units(25));
    assert_eq!(m.engine.balance_of(m.buyer, &m.warzone), units(50));
    assert_eq!(m.engine.balance_of(m.buyer, &m.vanguard), units(75));
    m.engine.verify_all().unwrap();
}

#[test]
fn cancelled_order_cannot_be_fulfilled() {
    let mut m = Market::new();
    m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap();
    m.engine.deposit(m.buyer, &m.vanguard, units(100)).unwrap();
    let id = m.engine.create_order(m.seller, m.standard_terms()).unwrap();
    m.engine.cancel_order(m.seller, id).unwrap();

    let err = m.engine.fulfill_order(m.buyer, id).unwrap_err();
    assert!(matches!(
        err,
        EscrowswapError::OrderNotActive {
            status: OrderStatus::Cancelled,
            ..
        }
    ));
    assert_eq!(m.engine.balance_of(m.buyer, &m.vanguard), units(100));
}

#[test]
fn fulfilled_order_cannot_be_fulfilled_or_cancelled_again() {
    let mut m = Market::new();
    m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap();
    m.engine.deposit(m.buyer, &m.vanguard, units(100)).unwrap();
    let id = m.engine.create_order(m.seller, m.standard_terms()).unwrap();
    m.engine.fulfill_order(m.buyer, id).unwrap();
    let journaled = m.engine.journal().len();

    assert!(matches!(
        m.engine.fulfill_order(m.buyer, id),
        Err(EscrowswapError::OrderNotActive { .. })
    ));
    assert!(matches!(
        m.engine.cancel_order(m.seller, id),
        Err(EscrowswapError::OrderNotActive { .. })
    ));
    assert_eq!(m.engine.journal().len(), journaled);
}

#[test]
fn buyer_without_funds_cannot_fulfill() {
    let mut m = Market::new();
    m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap();
    m.engine.deposit(m.buyer, &m.vanguard, units(10)).unwrap();
    let id = m.engine.create_order(m.seller, m.standard_terms()).unwrap();

    let err = m.engine.fulfill_order(m.buyer, id).unwrap_err();
    assert!(matches!(err, EscrowswapError::InsufficientBalance { .. }));
    assert!(m.engine.get_order(id).unwrap().is_active());
    assert_eq!(m.engine.balance_of(m.buyer, &m.vanguard), units(10));
    assert_eq!(m.engine.balance_of(m.buyer, &m.warzone), 0);
}

#[test]
fn full_round_trip_back_to_wallets() {
    let mut m = Market::new();
    m.engine.deposit(m.seller, &m.warzone, units(100)).unwrap();
    m.engine.deposit(m.buyer, &m.vanguard, units(100)).unwrap();
    let id = m.engine.create_order(m.seller, m.standard_terms()).unwrap();
    m.engine.fulfill_order(m.buyer, id).unwrap();

    m.engine.withdraw(m.seller, &m.warzone, units(50)).unwrap();
    m.engine.withdraw(m.seller, &m.vanguard, units(25)).unwrap();
    m.engine.withdraw(m.buyer, &m.warzone, units(50)).unwrap();
    m.engine.withdraw(m.buyer, &m.vanguard, units(75)).unwrap();

    let custody = m.engine.custody();
    assert_eq!(custody.balance_of(&m.warzone, &m.seller), units(950));
    assert_eq!(custody.balance_of(&m.vanguard, &m.seller), units(25));
    assert_eq!(custody.balance_of(&m.warzone, &m.buyer), units(50));
    assert_eq!(custody.balance_of(&m.vanguard, &m.buyer), units(975));
    assert_eq!(custody.vault_balance(&m.warzone), 0);
    assert_eq!(custody.vault_balance(&m.vanguard), 0);
    m.engine.verify_all().unwrap();
    m.engine.journal().verify_chain().unwrap();
}
