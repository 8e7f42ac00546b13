//! Direct-mapped transposition table keyed by Zobrist hash.
//!
//! One entry per slot, indexed by the low bits of the key. Replacement is
//! depth-preferred across different keys and always-refresh for the same
//! key. A probe only ever returns an entry whose full key matches, so a
//! collision can surface stale ordering hints but never foreign data.

use crate::moves::move_encoding::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy)]
pub struct TtEntry {
    pub key: u64,
    pub depth: u8,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TtStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
    pub collisions: u64,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    slots: Vec<Option<TtEntry>>,
    index_mask: usize,
    stats: TtStats,
}

impl TranspositionTable {
    pub fn new_with_mb(size_mb: usize) -> Self {
        let bytes = size_mb.max(1) * 1024 * 1024;
        let slot_size = std::mem::size_of::<Option<TtEntry>>().max(1);
        let slot_count = (bytes / slot_size).max(1).next_power_of_two();
        Self {
            slots: vec![None; slot_count],
            index_mask: slot_count - 1,
            stats: TtStats::default(),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.stats = TtStats::default();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    #[inline]
    pub fn stats(&self) -> TtStats {
        self.stats
    }

    #[inline]
    fn slot_index(&self, key: u64) -> usize {
        (key as usize) & self.index_mask
    }

    /// Look up `key`; returns an entry only on exact key equality.
    pub fn probe(&mut self, key: u64) -> Option<TtEntry> {
        self.stats.probes += 1;
        let entry = self.slots[self.slot_index(key)]?;
        if entry.key == key {
            self.stats.hits += 1;
            Some(entry)
        } else {
            None
        }
    }

    /// Store `entry`. The same key always refreshes its slot; a resident
    /// entry for a different key survives only if it is strictly deeper.
    pub fn store(&mut self, entry: TtEntry) {
        self.stats.stores += 1;
        let idx = self.slot_index(entry.key);

        match self.slots[idx] {
            Some(existing) if existing.key != entry.key => {
                self.stats.collisions += 1;
                if existing.depth > entry.depth {
                    return;
                }
            }
            _ => {}
        }

        self.slots[idx] = Some(entry);
    }
}
