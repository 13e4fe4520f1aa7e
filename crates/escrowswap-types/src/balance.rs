//! Balance types for the EscrowSwap ledger.
//!
//! Amounts are fixed-point integers in the token's smallest indivisible
//! unit. The unsigned representation makes negative balances unrepresentable.

use serde::{Deserialize, Serialize};

use crate::{AccountId, TokenId};

/// Token amount in the smallest indivisible unit.
pub type Amount = u128;

/// A single (owner, token) balance, as reported by ledger snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceEntry {
    pub owner: AccountId,
    pub token: TokenId,
    /// Spendable amount. Escrowed funds are not included.
    pub amount: Amount,
}

impl BalanceEntry {
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}
