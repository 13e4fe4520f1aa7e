//! Hash-chained event journal.
//!
//! Every successful engine operation appends exactly one [`SwapEvent`].
//! Each entry commits to its predecessor:
//!
//! ```text
//! hash = SHA-256(domain || prev_hash || sequence || recorded_at_secs || recorded_at_nanos || event)
//! ```
//!
//! The journal keeps at most `capacity` entries in memory. Evicted and
//! drained entries leave the chain head in place, so sequence numbers and
//! linkage continue across evictions.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use escrowswap_types::{constants, EscrowswapError, Result, SwapEvent};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One journaled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the journal, starting at 0.
    pub sequence: u64,
    pub event: SwapEvent,
    pub recorded_at: DateTime<Utc>,
    /// Hash of the previous entry (all zeros for the first).
    pub prev_hash: [u8; 32],
    pub hash: [u8; 32],
}

impl JournalEntry {
    fn compute_hash(
        prev_hash: &[u8; 32],
        sequence: u64,
        recorded_at: &DateTime<Utc>,
        event: &SwapEvent,
    ) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(constants::JOURNAL_DOMAIN);
        hasher.update(prev_hash);
        hasher.update(sequence.to_le_bytes());
        hasher.update(recorded_at.timestamp().to_le_bytes());
        hasher.update(recorded_at.timestamp_subsec_nanos().to_le_bytes());
        hasher.update(event.to_string().as_bytes());
        hasher.finalize().into()
    }

    /// Whether `hash` matches the entry's contents.
    #[must_use]
    pub fn is_intact(&self) -> bool {
        self.hash
            == Self::compute_hash(&self.prev_hash, self.sequence, &self.recorded_at, &self.event)
    }

    #[must_use]
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Bounded, append-only log of emitted events.
#[derive(Debug)]
pub struct EventJournal {
    entries: VecDeque<JournalEntry>,
    capacity: usize,
    next_sequence: u64,
    head: [u8; 32],
}

impl EventJournal {
    /// Create an empty journal.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "EventJournal capacity must be > 0");
        Self {
            entries: VecDeque::new(),
            capacity,
            next_sequence: 0,
            head: [0u8; 32],
        }
    }

    /// Append an event and return its sequence number.
    pub fn append(&mut self, event: SwapEvent) -> u64 {
        let sequence = self.next_sequence;
        let recorded_at = Utc::now();
        let hash = JournalEntry::compute_hash(&self.head, sequence, &recorded_at, &event);

        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }

        let entry = JournalEntry {
            sequence,
            event,
            recorded_at,
            prev_hash: self.head,
            hash,
        };
        tracing::debug!(
            sequence,
            kind = entry.event.kind(),
            hash = %entry.hash_hex(),
            "Event journaled"
        );

        self.entries.push_back(entry);
        self.head = hash;
        self.next_sequence += 1;
        sequence
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    /// Retained entries with `sequence >= from`.
    pub fn since(&self, from: u64) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.sequence >= from)
    }

    /// Remove and return all retained entries. The chain head is kept.
    pub fn drain(&mut self) -> Vec<JournalEntry> {
        self.entries.drain(..).collect()
    }

    /// Hash of the most recent entry ever appended.
    #[must_use]
    pub fn head(&self) -> [u8; 32] {
        self.head
    }

    /// Sequence number the next append will receive.
    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recompute every retained hash and check the linkage between
    /// consecutive entries.
    ///
    /// # Errors
    /// Returns `JournalCorrupted` naming the first broken entry.
    pub fn verify_chain(&self) -> Result<()> {
        let mut prev: Option<&JournalEntry> = None;
        for entry in &self.entries {
            if !entry.is_intact() {
                return Err(EscrowswapError::JournalCorrupted {
                    sequence: entry.sequence,
                    reason: "hash mismatch".to_string(),
                });
            }
            if let Some(p) = prev {
                if entry.prev_hash != p.hash || entry.sequence != p.sequence + 1 {
                    return Err(EscrowswapError::JournalCorrupted {
                        sequence: entry.sequence,
                        reason: "does not follow its predecessor".to_string(),
                    });
                }
            }
            prev = Some(entry);
        }
        if let Some(last) = prev {
            if last.hash != self.head {
                return Err(EscrowswapError::JournalCorrupted {
                    sequence: last.sequence,
                    reason: "head does not match last entry".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::new(constants::DEFAULT_JOURNAL_CAPACITY)
    }
}
