//! System-wide constants for the EscrowSwap ledger.

/// First order identifier handed out by a fresh book.
pub const FIRST_ORDER_ID: u64 = 0;

/// Default number of journal entries retained before the oldest are evicted.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 100_000;

/// Domain separator for journal entry hashes.
pub const JOURNAL_DOMAIN: &[u8] = b"escrowswap:journal:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "EscrowSwap";
