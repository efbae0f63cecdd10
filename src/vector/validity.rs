//! Validity bitmap.

/// Bits per validity word.
const BITS_PER_WORD: usize = 64;

/// One bit per row, set means the row holds a value.
///
/// A vector without a mask is all valid; a mask, once created, covers every
/// row of the vector's capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityMask {
    words: Vec<u64>,
    len: usize,
}

impl ValidityMask {
    /// Creates a mask with every row valid.
    #[must_use]
    pub fn all_valid(len: usize) -> Self {
        ValidityMask {
            words: vec![u64::MAX; len.div_ceil(BITS_PER_WORD)],
            len,
        }
    }

    /// Builds a mask from per-row flags.
    #[must_use]
    pub fn from_flags(flags: &[bool]) -> Self {
        let mut mask = Self::all_valid(flags.len());
        for (row, valid) in flags.iter().enumerate() {
            if !valid {
                mask.set_invalid(row);
            }
        }
        mask
    }

    /// Number of rows covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true when `row` holds a value. Rows past the end are invalid.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, row: usize) -> bool {
        if row >= self.len {
            return false;
        }
        (self.words[row / BITS_PER_WORD] >> (row % BITS_PER_WORD)) & 1 == 1
    }

    #[inline]
    pub fn set_invalid(&mut self, row: usize) {
        if row < self.len {
            self.words[row / BITS_PER_WORD] &= !(1_u64 << (row % BITS_PER_WORD));
        }
    }

    #[inline]
    pub fn set_valid(&mut self, row: usize) {
        if row < self.len {
            self.words[row / BITS_PER_WORD] |= 1_u64 << (row % BITS_PER_WORD);
        }
    }

    /// Counts valid rows among the first `count`.
    #[must_use]
    pub fn valid_count(&self, count: usize) -> usize {
        (0..count.min(self.len)).filter(|&r| self.is_valid(r)).count()
    }

    /// Address of the backing words, stable for the life of the mask.
    #[must_use]
    pub fn as_ptr(&self) -> *const u64 {
        self.words.as_ptr()
    }
}

/// Returns the mask in `slot`, creating an all-valid one first if absent.
pub(crate) fn ensure_writable(slot: &mut Option<ValidityMask>, len: usize) -> &mut ValidityMask {
    slot.get_or_insert_with(|| ValidityMask::all_valid(len))
}
