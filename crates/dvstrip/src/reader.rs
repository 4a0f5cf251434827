use std::io::{self, Read};

use tracing::trace;

use crate::error::{Result, ScanError};

/// Reads the input in caller-sized chunks, tracking how much of a known
/// total length has been read.
///
/// A chunk shorter than requested is only accepted when it ends exactly at
/// the known total length. Any other short read is an error.
pub struct ChunkReader<R> {
    inner: R,
    total_len: u64,
    bytes_read: u64,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(inner: R, total_len: u64) -> Self {
        Self {
            inner,
            total_len,
            bytes_read: 0,
        }
    }

    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Bytes of the input not yet read.
    pub fn remaining(&self) -> u64 {
        self.total_len - self.bytes_read
    }

    /// Fills `dst`, or as much of it as the rest of the input covers.
    ///
    /// Returns the number of bytes read.
    pub fn fill(&mut self, dst: &mut [u8]) -> Result<usize> {
        let requested = usize::try_from(self.remaining())
            .map_or(dst.len(), |remaining| remaining.min(dst.len()));

        let mut actual = 0;
        while actual < requested {
            match self.inner.read(&mut dst[actual..requested]) {
                Ok(0) => break,
                Ok(n) => actual += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.bytes_read += actual as u64;

        if actual != requested {
            return Err(ScanError::ShortRead { requested, actual });
        }

        trace!(
            requested,
            bytes_read = self.bytes_read,
            total_len = self.total_len,
            "read chunk"
        );
        Ok(actual)
    }
}
