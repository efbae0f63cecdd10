//! VARCHAR column storage.

use crate::types::{StringT, INLINE_LENGTH};

/// One row of a VARCHAR column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEntry {
    /// Up to [`INLINE_LENGTH`] bytes stored in place.
    Inlined { len: u8, bytes: [u8; INLINE_LENGTH] },
    /// Longer strings stored in the column's heap.
    Heap { offset: usize, len: usize },
}

impl Default for StringEntry {
    fn default() -> Self {
        StringEntry::Inlined {
            len: 0,
            bytes: [0; INLINE_LENGTH],
        }
    }
}

/// Row entries plus the heap holding out-of-line string bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringVector {
    entries: Vec<StringEntry>,
    heap: Vec<u8>,
}

impl StringVector {
    /// Creates `capacity` empty strings.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        StringVector {
            entries: vec![StringEntry::default(); capacity],
            heap: Vec::new(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes used by out-of-line strings.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        self.heap.len()
    }

    /// Returns the string at `row`.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize) -> StringT<'_> {
        match &self.entries[row] {
            StringEntry::Inlined { len, bytes } => StringT::new(&bytes[..usize::from(*len)]),
            StringEntry::Heap { offset, len } => StringT::new(&self.heap[*offset..*offset + *len]),
        }
    }

    /// Copies `value` into row `row`.
    ///
    /// A long value that fits in the row's previous heap slot overwrites it
    /// in place; otherwise it is appended to the heap.
    pub fn assign(&mut self, row: usize, value: &[u8]) {
        if value.len() <= INLINE_LENGTH {
            let mut bytes = [0; INLINE_LENGTH];
            bytes[..value.len()].copy_from_slice(value);
            self.entries[row] = StringEntry::Inlined {
                len: value.len() as u8,
                bytes,
            };
            return;
        }
        let offset = match self.entries[row] {
            StringEntry::Heap { offset, len } if len >= value.len() => {
                self.heap[offset..offset + value.len()].copy_from_slice(value);
                offset
            }
            _ => {
                let offset = self.heap.len();
                self.heap.extend_from_slice(value);
                offset
            }
        };
        self.entries[row] = StringEntry::Heap {
            offset,
            len: value.len(),
        };
    }
}
