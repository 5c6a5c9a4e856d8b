//! Sequential wrapping cursor
//!
//! Walks a pool of `len` positions in order: 0, 1, 2, ... and wraps back to 0
//! after the last position. Data providers keep one cursor per thread (or one
//! shared cursor) on top of this.

/// Wrapping position inside a pool of values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WrappingCursor {
    /// Position returned by the next call to [`WrappingCursor::next_index`]
    position: u64,
}

impl WrappingCursor {
    /// Create a cursor at the start of the pool
    pub fn new() -> Self {
        Self { position: 0 }
    }

    /// Create a cursor at a given position
    pub fn at(position: u64) -> Self {
        Self { position }
    }

    /// Position the next call will return
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Return the current position and advance, wrapping at `len`
    pub fn next_index(&mut self, len: u64) -> u64 {
        if len == 0 {
            return 0; // empty pool
        }
        if self.position >= len {
            self.position = 0;
        }

        let index = self.position;
        self.position += 1;
        if self.position >= len {
            self.position = 0;
        }

        index
    }

    /// Rewind to the start of the pool
    pub fn reset(&mut self) {
        self.position = 0;
    }
}

/// Position following `index` in a pool of `len`, wrapping to 0
#[inline]
pub fn wrap_next(index: u64, len: u64) -> u64 {
    if len == 0 || index + 1 >= len {
        0
    } else {
        index + 1
    }
}
