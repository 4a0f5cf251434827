//! # dvstrip-engine
//!
//! Streaming scanner for AV1 elementary streams in the low-overhead OBU
//! format. It counts the Dolby Vision RPU metadata OBUs in a stream and can
//! write a copy of the stream with those OBUs removed.
//!
//! The input is read through a fixed-size sliding window, so memory use is
//! bounded by the chunk size and the largest OBU must fit inside it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use dvstrip_engine::{ScanConfig, scan_file};
//!
//! let config = ScanConfig::default().with_chunk_size(1 << 20);
//! let stats = scan_file(
//!     Path::new("input.obu"),
//!     Some(Path::new("output.obu")),
//!     &config,
//!     |_| {},
//! )?;
//! println!("{} of {} OBUs were Dolby Vision", stats.dolby_vision_obus, stats.obus);
//! # Ok::<(), dvstrip_engine::ScanError>(())
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod output;
pub mod progress;
pub mod reader;
pub mod scanner;
pub mod window;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::info;

pub use classifier::{Verdict, classify, is_dolby_vision_rpu};
pub use config::{DEFAULT_CHUNK_SIZE, ProgressConfig, ScanConfig};
pub use error::{Result, ScanError};
pub use progress::ScanProgress;
pub use scanner::{ScanReport, ScanStats, Scanner};

/// Scans the file at `input`, writing the stream minus its Dolby Vision OBUs
/// to `output` when one is given.
///
/// The output file is created (or truncated) before scanning starts and is
/// left partially written if the scan fails.
pub fn scan_file<F>(
    input: &Path,
    output: Option<&Path>,
    config: &ScanConfig,
    on_progress: F,
) -> Result<ScanStats>
where
    F: FnMut(&ScanProgress) + 'static,
{
    config.validate()?;

    if let Some(output) = output
        && is_same_file(input, output)
    {
        return Err(ScanError::InvalidConfig(format!(
            "output {} is the input file",
            output.display()
        )));
    }

    let file = File::open(input).map_err(|source| ScanError::Open {
        path: input.to_path_buf(),
        source,
    })?;
    let input_len = file.metadata()?.len();

    info!(
        input = %input.display(),
        input_len,
        chunk_size = config.chunk_size,
        output = ?output,
        "Opened input"
    );

    let writer = output
        .map(|path| {
            File::create(path)
                .map(BufWriter::new)
                .map_err(|source| ScanError::Open {
                    path: path.to_path_buf(),
                    source,
                })
        })
        .transpose()?;

    let mut scanner = Scanner::new(file, input_len, writer, config)?;
    scanner.set_progress_callback(on_progress);
    let report = scanner.run()?;
    Ok(report.stats)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
