//! # escrowswap-ledger
//!
//! **Balance Ledger**: the authoritative record of each owner's spendable
//! balance per token, and the boundary to the external token contracts.
//!
//! ## Architecture
//!
//! 1. **TokenCustody**: the untrusted collaborator that pulls tokens into
//!    custody and pushes them back out
//! 2. **BalanceLedger**: per-(owner, token) credit balances; deposit and
//!    withdraw move funds across the custody boundary, credit and debit
//!    move them internally
//! 3. **SupplyConservation**: per-token deposit/withdrawal totals used to
//!    verify that no funds were created or destroyed
//!
//! ## Ordering at the custody boundary
//!
//! ```text
//! deposit:  custody.transfer_in()  → credit balance     (pull-then-credit)
//! withdraw: debit balance          → custody.transfer_out() (debit-then-push)
//! ```

pub mod balance_ledger;
pub mod custody;
pub mod supply_conservation;

pub use balance_ledger::BalanceLedger;
pub use custody::{CustodyError, InMemoryCustody, TokenCustody};
pub use supply_conservation::SupplyConservation;
