//! Supply conservation invariant checker.
//!
//! Invariant enforced for every token:
//! ```text
//! Σ balances + Σ escrow(active orders) == Σ deposits − Σ withdrawals
//! ```
//!
//! Order-book operations only move funds between owners and escrow, so
//! they never change either side of the equation.

use std::collections::{BTreeSet, HashMap};

use escrowswap_types::{Amount, EscrowswapError, Result, TokenId};

/// Tracks per-token deposit and withdrawal totals since genesis.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    deposits: HashMap<TokenId, Amount>,
    withdrawals: HashMap<TokenId, Amount>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deposit.
    pub fn record_deposit(&mut self, token: &TokenId, amount: Amount) {
        let total = self.deposits.entry(token.clone()).or_default();
        *total = total.saturating_add(amount);
    }

    /// Record a withdrawal.
    pub fn record_withdrawal(&mut self, token: &TokenId, amount: Amount) {
        let total = self.withdrawals.entry(token.clone()).or_default();
        *total = total.saturating_add(amount);
    }

    /// Expected amount under custody for a token: deposits − withdrawals.
    #[must_use]
    pub fn expected_supply(&self, token: &TokenId) -> Amount {
        self.total_deposits(token)
            .saturating_sub(self.total_withdrawals(token))
    }

    /// Verify that `actual_supply` (balances plus escrow) matches the
    /// expected supply for `token`.
    ///
    /// # Errors
    /// Returns [`EscrowswapError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, token: &TokenId, actual_supply: Amount) -> Result<()> {
        let expected = self.expected_supply(token);
        if actual_supply != expected {
            return Err(EscrowswapError::SupplyInvariantViolation {
                reason: format!(
                    "Token {token}: actual supply {actual_supply} != expected {expected} \
                     (deposits={}, withdrawals={})",
                    self.total_deposits(token),
                    self.total_withdrawals(token),
                ),
            });
        }
        Ok(())
    }

    /// Every token that was ever deposited or withdrawn, sorted.
    #[must_use]
    pub fn tracked_tokens(&self) -> Vec<TokenId> {
        let tokens: BTreeSet<&TokenId> = self
            .deposits
            .keys()
            .chain(self.withdrawals.keys())
            .collect();
        tokens.into_iter().cloned().collect()
    }

    #[must_use]
    pub fn total_deposits(&self, token: &TokenId) -> Amount {
        self.deposits.get(token).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_withdrawals(&self, token: &TokenId) -> Amount {
        self.withdrawals.get(token).copied().unwrap_or(0)
    }
}
