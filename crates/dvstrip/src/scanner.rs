//! Single-pass scanner driving the window over an OBU stream.
//!
//! Each iteration locates one OBU at the window cursor, classifies it, and
//! either counts it as Dolby Vision or forwards it to the output. The
//! window is compacted and refilled ahead of time once the cursor passes
//! half its capacity, and on demand when an OBU straddles the end of the
//! buffered data. On-demand refills only repeat while they add bytes, so a
//! stream cut off mid-OBU ends in [`ScanError::Truncated`] rather than a
//! retry loop.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use av1::{Av1Error, ObuSpan, locate_obu};
use tracing::{debug, info, trace};

use crate::classifier::{Verdict, classify};
use crate::config::{ProgressConfig, ScanConfig};
use crate::error::{Result, ScanError};
use crate::output::ObuWriter;
use crate::progress::{ProgressReporter, ScanProgress};
use crate::reader::ChunkReader;
use crate::window::Window;

/// Counters accumulated over a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// OBUs scanned.
    pub obus: u64,
    /// OBUs classified as Dolby Vision and dropped.
    pub dolby_vision_obus: u64,
    /// Input bytes covered by scanned OBUs.
    pub bytes_consumed: u64,
    /// Bytes of the dropped OBUs.
    pub bytes_dropped: u64,
    /// Bytes written to the output, 0 without one.
    pub bytes_written: u64,
    /// Window compactions, ahead of time and on demand.
    pub compactions: u64,
    /// On-demand refills caused by an OBU straddling the buffered data.
    pub retries: u64,
    /// Wall time of the scan.
    pub elapsed: Duration,
}

/// Result of a completed scan.
#[derive(Debug)]
pub struct ScanReport<W> {
    /// Final counters.
    pub stats: ScanStats,
    /// The output writer, flushed.
    pub output: Option<W>,
}

/// Streams OBUs from `R` through a fixed-capacity window, classifying each
/// one and forwarding the kept OBUs to an optional `W`.
pub struct Scanner<R: Read, W: Write> {
    reader: ChunkReader<R>,
    window: Window,
    output: Option<ObuWriter<W>>,
    progress_config: ProgressConfig,
    progress: Option<ProgressReporter>,
    stats: ScanStats,
}

impl<R: Read, W: Write> Scanner<R, W> {
    /// Creates a scanner over `input_len` bytes of `input`.
    ///
    /// The window is allocated here; with `output` set, every OBU that is
    /// not Dolby Vision is copied to it.
    pub fn new(input: R, input_len: u64, output: Option<W>, config: &ScanConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            reader: ChunkReader::new(input, input_len),
            window: Window::with_capacity(config.chunk_size)?,
            output: output.map(ObuWriter::new),
            progress_config: config.progress,
            progress: None,
            stats: ScanStats::default(),
        })
    }

    pub fn set_progress_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&ScanProgress) + 'static,
    {
        self.progress = Some(ProgressReporter::new(
            Box::new(callback),
            self.progress_config,
        ));
    }

    /// Scans the whole input.
    pub fn run(mut self) -> Result<ScanReport<W>> {
        let started = Instant::now();
        let total_len = self.reader.total_len();

        info!(
            input_len = total_len,
            chunk_size = self.window.capacity(),
            filtering = self.output.is_some(),
            "Starting scan"
        );

        self.window.refill(&mut self.reader)?;

        while self.stats.bytes_consumed < total_len {
            if self.progress.is_some() {
                let snapshot = self.snapshot(started);
                if let Some(progress) = self.progress.as_mut() {
                    progress.maybe_report(&snapshot);
                }
            }

            if self.window.cursor() * 2 > self.window.capacity() {
                self.compact_and_refill()?;
            }

            let span = self.next_span()?;
            self.route(span)?;
        }

        self.stats.elapsed = started.elapsed();
        let snapshot = self.snapshot(started);
        if let Some(progress) = self.progress.as_mut() {
            progress.report(&snapshot);
        }

        let output = match self.output {
            Some(writer) => {
                self.stats.bytes_written = writer.bytes_written();
                Some(writer.finish()?)
            }
            None => None,
        };

        info!(
            obus = self.stats.obus,
            dolby_vision_obus = self.stats.dolby_vision_obus,
            bytes_written = self.stats.bytes_written,
            compactions = self.stats.compactions,
            retries = self.stats.retries,
            elapsed_ms = self.stats.elapsed.as_millis() as u64,
            "Scan complete"
        );

        Ok(ScanReport {
            stats: self.stats,
            output,
        })
    }

    /// Locates the OBU at the cursor, refilling the window while it is only
    /// partially buffered.
    fn next_span(&mut self) -> Result<ObuSpan> {
        loop {
            let err = match locate_obu(self.window.data()) {
                Ok(span) => return Ok(span),
                Err(e) => e,
            };

            let Av1Error::NeedMoreData { required, .. } = err else {
                return Err(self.parse_error(err));
            };

            let offset = self.stats.bytes_consumed;
            let occupied = self.window.occupied();
            let available = occupied as u64 + self.reader.remaining();
            if required as u64 > available {
                return Err(ScanError::Truncated {
                    offset,
                    required,
                    available,
                });
            }
            if required > self.window.capacity() {
                return Err(ScanError::ChunkTooSmall {
                    required,
                    capacity: self.window.capacity(),
                });
            }

            debug!(offset, required, occupied, "OBU extends past buffered data, refilling");
            self.stats.retries += 1;
            if self.compact_and_refill()? == 0 {
                // the oracle asked for bytes that are already buffered
                return Err(self.parse_error(err));
            }
        }
    }

    fn route(&mut self, span: ObuSpan) -> Result<()> {
        let offset = self.stats.bytes_consumed;
        let total_len = span.total_len();
        let obu = &self.window.data()[..total_len];

        let verdict = classify(&span, &obu[span.payload_range()])
            .map_err(|source| ScanError::Decode { offset, source })?;

        trace!(
            offset,
            obu_type = ?span.obu_type,
            size = total_len,
            temporal_id = span.temporal_id,
            spatial_id = span.spatial_id,
            ?verdict,
            "OBU"
        );

        match verdict {
            Verdict::Drop => {
                self.stats.dolby_vision_obus += 1;
                self.stats.bytes_dropped += total_len as u64;
            }
            Verdict::Forward => {
                if let Some(output) = self.output.as_mut() {
                    output.write_obu(obu)?;
                }
            }
        }

        self.window.advance(total_len);
        self.stats.obus += 1;
        self.stats.bytes_consumed += total_len as u64;
        Ok(())
    }

    fn compact_and_refill(&mut self) -> Result<usize> {
        self.window.compact();
        let added = self.window.refill(&mut self.reader)?;
        self.stats.compactions += 1;
        trace!(
            added,
            occupied = self.window.occupied(),
            bytes_read = self.reader.bytes_read(),
            "Compacted window"
        );
        Ok(added)
    }

    fn parse_error(&self, source: Av1Error) -> ScanError {
        ScanError::Parse {
            offset: self.stats.bytes_consumed,
            cursor: self.window.cursor(),
            occupied: self.window.occupied(),
            source,
        }
    }

    fn snapshot(&self, started: Instant) -> ScanProgress {
        ScanProgress {
            bytes_consumed: self.stats.bytes_consumed,
            total_bytes: self.reader.total_len(),
            obus: self.stats.obus,
            dolby_vision_obus: self.stats.dolby_vision_obus,
            elapsed: started.elapsed(),
        }
    }
}
