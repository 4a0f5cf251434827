use std::io::{self, Write};

use crate::error::{Result, ScanError};

/// Writes forwarded OBUs verbatim to the filtered output.
pub struct ObuWriter<W: Write> {
    writer: W,
    bytes_written: u64,
}

impl<W: Write> ObuWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    /// Writes all of `obu`, failing with [`ScanError::ShortWrite`] if the
    /// writer stops accepting bytes part way through.
    pub fn write_obu(&mut self, obu: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < obu.len() {
            match self.writer.write(&obu[written..]) {
                Ok(0) => {
                    return Err(ScanError::ShortWrite {
                        requested: obu.len(),
                        actual: written,
                    });
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.bytes_written += written as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts `capacity` bytes, then reports a zero-length write.
    struct FullDisk {
        data: Vec<u8>,
        capacity: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.capacity - self.data.len());
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_obus() {
        let mut writer = ObuWriter::new(Vec::new());
        writer.write_obu(&[0x12, 0x00]).unwrap();
        writer.write_obu(&[0x0A, 0x01, 0xFF]).unwrap();
        writer.write_obu(&[]).unwrap();
        assert_eq!(writer.bytes_written(), 5);
        assert_eq!(writer.finish().unwrap(), [0x12, 0x00, 0x0A, 0x01, 0xFF]);
    }

    #[test]
    fn test_short_write_is_error() {
        let mut writer = ObuWriter::new(FullDisk {
            data: Vec::new(),
            capacity: 3,
        });
        writer.write_obu(&[1, 2]).unwrap();

        let err = writer.write_obu(&[3, 4, 5]).unwrap_err();
        assert!(matches!(
            err,
            ScanError::ShortWrite {
                requested: 3,
                actual: 1
            }
        ));
        assert_eq!(writer.bytes_written(), 2);
    }
}
