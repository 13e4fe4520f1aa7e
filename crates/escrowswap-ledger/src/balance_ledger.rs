//! Balance ledger.
//!
//! Tracks per-(owner, token) spendable balances. All mutations are atomic:
//! either the full operation succeeds or the ledger is unchanged.

use std::collections::HashMap;

use escrowswap_types::{
    AccountId, Amount, BalanceEntry, EscrowswapError, Result, SwapEvent, TokenId,
};

use crate::custody::TokenCustody;
use crate::supply_conservation::SupplyConservation;

/// The authoritative record of each owner's spendable balance per token.
///
/// Funds escrowed by active orders are not part of any balance here; the
/// order book debits them at creation and credits them back on close.
#[derive(Debug, Default)]
pub struct BalanceLedger {
    /// Per-(owner, token) balances. Absent means zero.
    balances: HashMap<(AccountId, TokenId), Amount>,
    /// Deposit / withdrawal totals.
    supply: SupplyConservation,
}

impl BalanceLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull `amount` of `token` from `owner` into custody, then credit it.
    ///
    /// The custody pull happens first; if it fails nothing is credited.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount` is zero
    /// - `BalanceOverflow` if the credit could not be represented
    /// - `TransferFailed` if custody refuses the pull
    pub fn deposit<C: TokenCustody + ?Sized>(
        &mut self,
        custody: &mut C,
        owner: AccountId,
        token: &TokenId,
        amount: Amount,
    ) -> Result<SwapEvent> {
        if amount == 0 {
            return Err(EscrowswapError::InvalidAmount);
        }
        self.check_credit(owner, token, amount)?;

        custody
            .transfer_in(token, &owner, amount)
            .map_err(|err| {
                tracing::warn!(
                    owner = %owner,
                    token = %token,
                    amount,
                    error = %err,
                    "Deposit pull rejected by custody"
                );
                EscrowswapError::TransferFailed {
                    token: token.clone(),
                    reason: err.to_string(),
                }
            })?;

        self.credit(owner, token, amount)?;
        self.supply.record_deposit(token, amount);

        tracing::info!(owner = %owner, token = %token, amount, "Tokens deposited");
        Ok(SwapEvent::TokensDeposited {
            owner,
            token: token.clone(),
            amount,
        })
    }

    /// Debit `amount` of `token` from `owner`, then push it out of custody.
    ///
    /// The balance is reduced before custody is called, so custody never
    /// observes a balance that still includes the funds in flight. If the
    /// push fails the debit is reverted.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount` is zero
    /// - `InsufficientBalance` if `amount` exceeds the balance
    /// - `TransferFailed` if custody refuses the push
    pub fn withdraw<C: TokenCustody + ?Sized>(
        &mut self,
        custody: &mut C,
        owner: AccountId,
        token: &TokenId,
        amount: Amount,
    ) -> Result<SwapEvent> {
        if amount == 0 {
            return Err(EscrowswapError::InvalidAmount);
        }
        self.debit(owner, token, amount)?;

        if let Err(err) = custody.transfer_out(token, &owner, amount) {
            tracing::warn!(
                owner = %owner,
                token = %token,
                amount,
                error = %err,
                "Withdrawal push rejected by custody, restoring balance"
            );
            // Re-crediting what was just debited cannot overflow.
            self.credit(owner, token, amount)?;
            return Err(EscrowswapError::TransferFailed {
                token: token.clone(),
                reason: err.to_string(),
            });
        }

        self.supply.record_withdrawal(token, amount);

        tracing::info!(owner = %owner, token = %token, amount, "Tokens withdrawn");
        Ok(SwapEvent::TokensWithdrawn {
            owner,
            token: token.clone(),
            amount,
        })
    }

    /// Spendable balance of `owner` in `token`. Zero if never funded.
    #[must_use]
    pub fn balance_of(&self, owner: AccountId, token: &TokenId) -> Amount {
        self.balances
            .get(&(owner, token.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Internal credit. Does not touch custody.
    ///
    /// Only for moving balances that already exist in the ledger, such as
    /// order escrow returning to a seller or a swap leg. Crediting without a
    /// matching debit creates unbacked balance, which [`verify_supply`]
    /// reports as a `SupplyInvariantViolation`.
    ///
    /// [`verify_supply`]: Self::verify_supply
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the new balance would not fit.
    pub fn credit(&mut self, owner: AccountId, token: &TokenId, amount: Amount) -> Result<()> {
        let entry = self.balances.entry((owner, token.clone())).or_default();
        *entry = entry
            .checked_add(amount)
            .ok_or(EscrowswapError::BalanceOverflow)?;
        tracing::debug!(owner = %owner, token = %token, amount, "Ledger credit");
        Ok(())
    }

    /// Internal debit. Does not touch custody.
    ///
    /// Pair with a [`credit`](Self::credit) or an escrow record, otherwise
    /// the debited amount leaves the ledger without a withdrawal.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if `amount` exceeds the balance.
    pub fn debit(&mut self, owner: AccountId, token: &TokenId, amount: Amount) -> Result<()> {
        self.check_debit(owner, token, amount)?;
        if let Some(entry) = self.balances.get_mut(&(owner, token.clone())) {
            *entry -= amount;
            if *entry == 0 {
                self.balances.remove(&(owner, token.clone()));
            }
        }
        tracing::debug!(owner = %owner, token = %token, amount, "Ledger debit");
        Ok(())
    }

    /// Whether [`debit`](Self::debit) would succeed, without mutating.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if `amount` exceeds the balance.
    pub fn check_debit(&self, owner: AccountId, token: &TokenId, amount: Amount) -> Result<()> {
        let available = self.balance_of(owner, token);
        if available < amount {
            return Err(EscrowswapError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// Whether [`credit`](Self::credit) would succeed, without mutating.
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the new balance would not fit.
    pub fn check_credit(&self, owner: AccountId, token: &TokenId, amount: Amount) -> Result<()> {
        self.balance_of(owner, token)
            .checked_add(amount)
            .map(|_| ())
            .ok_or(EscrowswapError::BalanceOverflow)
    }

    /// Sum of all owners' spendable balances of `token`.
    #[must_use]
    pub fn total_held(&self, token: &TokenId) -> Amount {
        self.balances
            .iter()
            .filter(|((_, t), _)| t == token)
            .map(|(_, amount)| *amount)
            .fold(0, Amount::saturating_add)
    }

    /// All non-zero balances of `owner`, sorted by token.
    #[must_use]
    pub fn balances_of(&self, owner: AccountId) -> Vec<BalanceEntry> {
        let mut entries: Vec<BalanceEntry> = self
            .balances
            .iter()
            .filter(|((o, _), _)| *o == owner)
            .map(|((o, t), amount)| BalanceEntry {
                owner: *o,
                token: t.clone(),
                amount: *amount,
            })
            .collect();
        entries.sort_by(|a, b| a.token.cmp(&b.token));
        entries
    }

    /// Deposit / withdrawal totals.
    #[must_use]
    pub fn supply(&self) -> &SupplyConservation {
        &self.supply
    }

    /// Verify conservation for `token`, given the amount currently held in
    /// escrow by active orders.
    ///
    /// # Errors
    /// Returns `SupplyInvariantViolation` if funds were created or destroyed.
    pub fn verify_supply(&self, token: &TokenId, escrowed: Amount) -> Result<()> {
        let actual = self.total_held(token).saturating_add(escrowed);
        self.supply.verify(token, actual)
    }
}
