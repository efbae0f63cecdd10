//! Text argument view.

use std::fmt;
use std::str::Utf8Error;

/// Strings up to this many bytes are stored inside the column's entry array.
pub const INLINE_LENGTH: usize = 12;

/// A VARCHAR value borrowed from a column for the duration of one batch.
///
/// Short strings point into the column's entry array; longer strings point
/// into the column's heap buffer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringT<'a> {
    bytes: &'a [u8],
}

impl<'a> StringT<'a> {
    /// Wraps raw bytes.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        StringT { bytes }
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns whether the string fits the inline representation.
    #[must_use]
    pub fn is_inlined(&self) -> bool {
        self.bytes.len() <= INLINE_LENGTH
    }

    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns the value as `&str`.
    ///
    /// # Errors
    ///
    /// Returns a [`Utf8Error`] when the bytes are not valid UTF-8.
    pub fn to_str(&self) -> Result<&'a str, Utf8Error> {
        std::str::from_utf8(self.bytes)
    }
}

impl<'a> From<&'a str> for StringT<'a> {
    fn from(value: &'a str) -> Self {
        StringT::new(value.as_bytes())
    }
}

impl fmt::Debug for StringT<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.bytes))
    }
}

impl PartialEq<&str> for StringT<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}
