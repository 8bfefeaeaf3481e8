/// Growable bit set indexed by pool slot.
///
/// Used for pool validity flags and the per-frame visible-object set.
/// Bits beyond the current length read as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSet {
    words: Vec<u64>,
    len: usize,
}

const WORD_BITS: usize = 64;

impl BitSet {
    /// Create an empty bit set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bit set of `len` bits, all unset
    pub fn with_len(len: usize) -> Self {
        let mut set = Self::new();
        set.resize(len);
        set
    }

    /// Number of addressable bits
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the set has no addressable bits
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Grow or shrink to `len` bits. New bits are unset.
    pub fn resize(&mut self, len: usize) {
        self.words.resize(len.div_ceil(WORD_BITS), 0);
        self.len = len;

        // Clear bits past the new end so a later grow does not resurrect them
        let tail = len % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }

    /// Set bit `index`, growing the set if needed
    pub fn set(&mut self, index: usize) {
        if index >= self.len {
            self.resize(index + 1);
        }
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    /// Clear bit `index`. Out-of-range indices are ignored.
    pub fn unset(&mut self, index: usize) {
        if index < self.len {
            self.words[index / WORD_BITS] &= !(1u64 << (index % WORD_BITS));
        }
    }

    /// Test bit `index`
    pub fn get(&self, index: usize) -> bool {
        index < self.len && self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// Clear every bit, keeping the length
    pub fn clear_all(&mut self) {
        self.words.iter_mut().for_each(|word| *word = 0);
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Iterate the indices of set bits in ascending order
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(word_index, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(word_index * WORD_BITS + bit)
            })
        })
    }
}

#[cfg(test)]
#[path = "bit_set_tests.rs"]
mod tests;
