use std::time::{Duration, Instant};

use crate::config::ProgressConfig;

/// A snapshot of scan progress handed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub bytes_consumed: u64,
    pub total_bytes: u64,
    pub obus: u64,
    pub dolby_vision_obus: u64,
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Fraction of the input consumed, in `0.0..=1.0`.
    ///
    /// An empty input counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        self.bytes_consumed as f64 / self.total_bytes as f64
    }

    /// Estimated time remaining, extrapolated from the rate so far.
    ///
    /// `None` until some input has been consumed.
    pub fn eta(&self) -> Option<Duration> {
        let fraction = self.fraction();
        if fraction <= 0.0 {
            return None;
        }
        let total = self.elapsed.as_secs_f64() / fraction;
        Some(Duration::from_secs_f64(
            (total - self.elapsed.as_secs_f64()).max(0.0),
        ))
    }
}

pub type ProgressCallback = Box<dyn FnMut(&ScanProgress)>;

/// Decides when progress is worth reporting and forwards it to the callback.
pub(crate) struct ProgressReporter {
    callback: ProgressCallback,
    config: ProgressConfig,
    last_bytes: u64,
    last_time: Instant,
}

impl ProgressReporter {
    pub(crate) fn new(callback: ProgressCallback, config: ProgressConfig) -> Self {
        Self {
            callback,
            config,
            last_bytes: 0,
            last_time: Instant::now(),
        }
    }

    pub(crate) fn maybe_report(&mut self, progress: &ScanProgress) {
        let bytes_due =
            progress.bytes_consumed.saturating_sub(self.last_bytes) >= self.config.bytes_interval;
        if bytes_due || self.last_time.elapsed() >= self.config.time_interval {
            self.report(progress);
        }
    }

    pub(crate) fn report(&mut self, progress: &ScanProgress) {
        self.last_bytes = progress.bytes_consumed;
        self.last_time = Instant::now();
        (self.callback)(progress);
    }
}
