//! Shared parse position.

/// Raised when a cursor is asked to hold something that is not a byte offset.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("invalid offset: {0}")]
    InvalidOffset(String),
}

/// A byte offset into the backing buffer.
///
/// One cursor is owned by each level of the parse (the file, and every
/// container while its children are being read). A box parse step reads its
/// parent's cursor to learn where it starts and moves it past itself when done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    offset: usize,
}

impl Cursor {
    pub fn new(offset: usize) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Set the offset from any integer type, rejecting values that cannot be
    /// an offset (negative or wider than `usize`).
    pub fn try_set_offset<T>(&mut self, value: T) -> Result<(), CursorError>
    where
        T: TryInto<usize> + Copy + std::fmt::Display,
    {
        let offset = value
            .try_into()
            .map_err(|_| CursorError::InvalidOffset(value.to_string()))?;
        self.offset = offset;
        Ok(())
    }

    pub fn advance(&mut self, n: usize) {
        self.offset = self.offset.saturating_add(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_forward() {
        let mut c = Cursor::new(4);
        c.advance(8);
        assert_eq!(c.offset(), 12);
    }

    #[test]
    fn try_set_accepts_unsigned_and_positive() {
        let mut c = Cursor::default();
        c.try_set_offset(42u64).unwrap();
        assert_eq!(c.offset(), 42);
        c.try_set_offset(7i32).unwrap();
        assert_eq!(c.offset(), 7);
    }

    #[test]
    fn try_set_rejects_negative() {
        let mut c = Cursor::new(3);
        let err = c.try_set_offset(-1i64).unwrap_err();
        assert_eq!(err, CursorError::InvalidOffset("-1".into()));
        // unchanged on failure
        assert_eq!(c.offset(), 3);
    }
}
