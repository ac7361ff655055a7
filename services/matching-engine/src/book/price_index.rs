//! Sparse set of occupied price ticks with descending-order queries
//!
//! A bit-packed array over `[0, BPS)` with one word-level bitscan per 64
//! ticks. The match loop only ever needs one query: the highest set tick
//! strictly below a bound, which drives the descending level scan.

use types::numeric::{Price, BPS};

const WORD_BITS: usize = 64;
const WORDS: usize = (BPS as usize).div_ceil(WORD_BITS);

/// Occupancy bitmap over price ticks
///
/// Tick 0 is never set (prices are validated into `[1, BPS - 1]`), so a
/// set bit always maps back to a legal `Price`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PriceIndex {
    words: [u64; WORDS],
}

impl PriceIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Mark a tick as occupied
    pub fn set(&mut self, tick: Price) {
        let t = tick.get() as usize;
        self.words[t / WORD_BITS] |= 1u64 << (t % WORD_BITS);
    }

    /// Mark a tick as free
    pub fn unset(&mut self, tick: Price) {
        let t = tick.get() as usize;
        self.words[t / WORD_BITS] &= !(1u64 << (t % WORD_BITS));
    }

    /// Check whether a tick is marked occupied
    pub fn contains(&self, tick: Price) -> bool {
        let t = tick.get() as usize;
        self.words[t / WORD_BITS] & (1u64 << (t % WORD_BITS)) != 0
    }

    /// Highest set tick strictly below `upper_bound`, or None
    ///
    /// `upper_bound` may be any value up to `BPS`; passing `BPS` scans the
    /// whole index. Runs in O(words) worst case with one bitscan per word.
    pub fn find_last_set(&self, upper_bound: u64) -> Option<Price> {
        if upper_bound == 0 {
            return None;
        }
        let bound = (upper_bound.min(BPS) - 1) as usize;
        let mut word_idx = bound / WORD_BITS;
        let bit = bound % WORD_BITS;
        let mut mask = if bit == WORD_BITS - 1 {
            u64::MAX
        } else {
            (1u64 << (bit + 1)) - 1
        };
        loop {
            let word = self.words[word_idx] & mask;
            if word != 0 {
                let tick = word_idx * WORD_BITS + (WORD_BITS - 1 - word.leading_zeros() as usize);
                return Price::try_new(tick as u64).ok();
            }
            if word_idx == 0 {
                return None;
            }
            word_idx -= 1;
            mask = u64::MAX;
        }
    }

    /// Check if no tick is set
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Raw backing words, for state digests
    pub fn as_words(&self) -> &[u64] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_index_finds_nothing() {
        let index = PriceIndex::new();
        assert_eq!(index.find_last_set(BPS), None);
        assert!(index.is_empty());
    }

    #[test]
    fn test_set_and_find() {
        let mut index = PriceIndex::new();
        index.set(Price::new(400));
        assert!(index.contains(Price::new(400)));
        assert_eq!(index.find_last_set(BPS), Some(Price::new(400)));
    }

    #[test]
    fn test_find_returns_highest() {
        let mut index = PriceIndex::new();
        index.set(Price::new(400));
        index.set(Price::new(600));
        index.set(Price::new(500));
        assert_eq!(index.find_last_set(BPS), Some(Price::new(600)));
    }

    #[test]
    fn test_bound_is_strict() {
        let mut index = PriceIndex::new();
        index.set(Price::new(600));
        assert_eq!(index.find_last_set(600), None);
        assert_eq!(index.find_last_set(601), Some(Price::new(600)));
    }

    #[test]
    fn test_descending_scan() {
        let mut index = PriceIndex::new();
        for tick in [500u64, 400, 600] {
            index.set(Price::new(tick));
        }
        let mut bound = BPS;
        let mut seen = Vec::new();
        while let Some(tick) = index.find_last_set(bound) {
            seen.push(tick.get());
            bound = tick.get();
        }
        assert_eq!(seen, vec![600, 500, 400]);
    }

    #[test]
    fn test_unset_clears() {
        let mut index = PriceIndex::new();
        index.set(Price::new(600));
        index.set(Price::new(400));
        index.unset(Price::new(600));
        assert!(!index.contains(Price::new(600)));
        assert_eq!(index.find_last_set(BPS), Some(Price::new(400)));
    }

    #[test]
    fn test_word_boundary_ticks() {
        // 63/64 and 127/128 straddle word boundaries
        let mut index = PriceIndex::new();
        for tick in [63u64, 64, 127, 128] {
            index.set(Price::new(tick));
        }
        assert_eq!(index.find_last_set(129), Some(Price::new(128)));
        assert_eq!(index.find_last_set(128), Some(Price::new(127)));
        assert_eq!(index.find_last_set(65), Some(Price::new(64)));
        assert_eq!(index.find_last_set(64), Some(Price::new(63)));
        assert_eq!(index.find_last_set(63), None);
    }

    #[test]
    fn test_extreme_ticks() {
        let mut index = PriceIndex::new();
        index.set(Price::new(1));
        index.set(Price::new(999));
        assert_eq!(index.find_last_set(BPS), Some(Price::new(999)));
        assert_eq!(index.find_last_set(999), Some(Price::new(1)));
        assert_eq!(index.find_last_set(1), None);
    }

    #[test]
    fn test_idempotent_set_unset() {
        let mut index = PriceIndex::new();
        index.set(Price::new(250));
        index.set(Price::new(250));
        index.unset(Price::new(250));
        assert!(index.is_empty());
        index.unset(Price::new(250));
        assert!(index.is_empty());
    }
}
