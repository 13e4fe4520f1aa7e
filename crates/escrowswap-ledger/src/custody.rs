//! Token custody boundary.
//!
//! The ledger never holds tokens itself. It asks a [`TokenCustody`]
//! implementation to pull tokens from an external holder (which must have
//! authorized the ledger beforehand) and to push tokens back out.
//! Implementations are untrusted: any call may fail, and the ledger orders
//! its own bookkeeping around each call so a failure never leaves a
//! half-applied balance.

use std::collections::{HashMap, HashSet};

use escrowswap_types::{AccountId, Amount, TokenId};
use thiserror::Error;

/// Why a custody transfer was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
    /// The holder has not authorized the ledger to pull this much.
    #[error("insufficient allowance: need {needed}, approved {approved}")]
    InsufficientAllowance { needed: Amount, approved: Amount },

    /// The holder does not own enough tokens.
    #[error("insufficient holder funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Amount, available: Amount },

    /// Custody holds less of the token than the ledger asked to release.
    #[error("vault shortfall: need {needed}, vault holds {held}")]
    VaultShortfall { needed: Amount, held: Amount },

    /// The token contract refused the transfer outright.
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Capability to move tokens across the ledger's custody boundary.
pub trait TokenCustody {
    /// Pull `amount` of `token` from `from` into custody.
    fn transfer_in(
        &mut self,
        token: &TokenId,
        from: &AccountId,
        amount: Amount,
    ) -> Result<(), CustodyError>;

    /// Push `amount` of `token` out of custody to `to`.
    fn transfer_out(
        &mut self,
        token: &TokenId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), CustodyError>;
}

/// In-memory ERC-20-style token contracts plus the ledger's vault.
///
/// Holders get tokens via [`mint`](Self::mint) and authorize the ledger via
/// [`approve`](Self::approve). `transfer_in` consumes allowance.
#[derive(Debug, Default)]
pub struct InMemoryCustody {
    holdings: HashMap<(TokenId, AccountId), Amount>,
    allowances: HashMap<(TokenId, AccountId), Amount>,
    vault: HashMap<TokenId, Amount>,
    halted: HashSet<TokenId>,
}

impl InMemoryCustody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` new tokens owned by `holder`.
    pub fn mint(&mut self, token: &TokenId, holder: AccountId, amount: Amount) {
        let held = self.holdings.entry((token.clone(), holder)).or_default();
        *held = held.saturating_add(amount);
    }

    /// Set the amount the ledger may pull from `holder` (replaces any
    /// previous approval).
    pub fn approve(&mut self, token: &TokenId, holder: AccountId, amount: Amount) {
        self.allowances.insert((token.clone(), holder), amount);
    }

    /// Make every transfer of `token` fail until [`resume`](Self::resume).
    pub fn halt(&mut self, token: &TokenId) {
        self.halted.insert(token.clone());
    }

    pub fn resume(&mut self, token: &TokenId) {
        self.halted.remove(token);
    }

    /// Tokens held by `holder` outside custody.
    #[must_use]
    pub fn balance_of(&self, token: &TokenId, holder: &AccountId) -> Amount {
        self.holdings
            .get(&(token.clone(), *holder))
            .copied()
            .unwrap_or(0)
    }

    /// Remaining amount `holder` lets the ledger pull.
    #[must_use]
    pub fn allowance(&self, token: &TokenId, holder: &AccountId) -> Amount {
        self.allowances
            .get(&(token.clone(), *holder))
            .copied()
            .unwrap_or(0)
    }

    /// Tokens currently in the ledger's custody.
    #[must_use]
    pub fn vault_balance(&self, token: &TokenId) -> Amount {
        self.vault.get(token).copied().unwrap_or(0)
    }

    fn check_halted(&self, token: &TokenId) -> Result<(), CustodyError> {
        if self.halted.contains(token) {
            return Err(CustodyError::Rejected(format!("{token} transfers halted")));
        }
        Ok(())
    }
}

impl TokenCustody for InMemoryCustody {
    fn transfer_in(
        &mut self,
        token: &TokenId,
        from: &AccountId,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        self.check_halted(token)?;

        let approved = self.allowance(token, from);
        if approved < amount {
            return Err(CustodyError::InsufficientAllowance {
                needed: amount,
                approved,
            });
        }
        let available = self.balance_of(token, from);
        if available < amount {
            return Err(CustodyError::InsufficientFunds {
                needed: amount,
                available,
            });
        }

        self.allowances
            .insert((token.clone(), *from), approved - amount);
        self.holdings
            .insert((token.clone(), *from), available - amount);
        let vault = self.vault.entry(token.clone()).or_default();
        *vault = vault.saturating_add(amount);
        Ok(())
    }

    fn transfer_out(
        &mut self,
        token: &TokenId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        self.check_halted(token)?;

        let held = self.vault_balance(token);
        if held < amount {
            return Err(CustodyError::VaultShortfall {
                needed: amount,
                held,
            });
        }

        self.vault.insert(token.clone(), held - amount);
        self.mint(token, *to, amount);
        Ok(())
    }
}
