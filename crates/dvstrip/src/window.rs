use std::io::Read;

use crate::error::{Result, ScanError};
use crate::reader::ChunkReader;

/// Fixed-capacity sliding window over the input.
///
/// Valid bytes live in `buf[cursor..end]`. Invariants:
/// - `cursor <= end <= capacity`
/// - `compact` moves the valid bytes to the front without altering them
/// - `refill` only appends after `end`
pub struct Window {
    buf: Box<[u8]>,
    cursor: usize,
    end: usize,
}

impl Window {
    /// Allocates a zeroed window, reporting allocation failure as an error.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ScanError::InvalidConfig(
                "window capacity must be greater than 0".into(),
            ));
        }

        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)
            .map_err(|_| ScanError::Allocation { capacity })?;
        buf.resize(capacity, 0);

        Ok(Self {
            buf: buf.into_boxed_slice(),
            cursor: 0,
            end: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Offset of the next unconsumed byte.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of valid, unconsumed bytes.
    pub fn occupied(&self) -> usize {
        self.end - self.cursor
    }

    /// Space after the valid bytes that a refill can use.
    pub fn free_tail(&self) -> usize {
        self.buf.len() - self.end
    }

    /// The unconsumed bytes.
    pub fn data(&self) -> &[u8] {
        &self.buf[self.cursor..self.end]
    }

    /// Marks `n` bytes as consumed.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds [`Window::occupied`].
    pub fn advance(&mut self, n: usize) {
        assert!(
            n <= self.occupied(),
            "advance past end of window: {n} > {}",
            self.occupied()
        );
        self.cursor += n;
    }

    /// Moves the unconsumed bytes to the start of the window.
    pub fn compact(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.buf.copy_within(self.cursor..self.end, 0);
        self.end -= self.cursor;
        self.cursor = 0;
    }

    /// Fills the free tail from `reader`, returning the number of bytes added.
    pub fn refill<R: Read>(&mut self, reader: &mut ChunkReader<R>) -> Result<usize> {
        let added = reader.fill(&mut self.buf[self.end..])?;
        self.end += added;
        Ok(added)
    }
}
