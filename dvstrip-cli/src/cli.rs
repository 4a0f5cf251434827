use std::path::PathBuf;

use clap::Parser;
use dvstrip_engine::DEFAULT_CHUNK_SIZE;

/// Count Dolby Vision OBUs in an AV1 stream and optionally strip them.
#[derive(Parser, Debug)]
#[command(name = "dvstrip", author, version, about, long_about = None)]
pub struct Args {
    /// Input AV1 elementary stream in low-overhead OBU format
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Window size in bytes; must hold the largest OBU in the stream
    #[arg(
        short,
        long,
        value_name = "BYTES",
        env = "DVSTRIP_CHUNK_SIZE",
        default_value_t = DEFAULT_CHUNK_SIZE,
        value_parser = parse_chunk_size
    )]
    pub chunk_size: usize,

    /// Write the stream without its Dolby Vision OBUs to FILE
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors and hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Args {
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress
    }
}

fn parse_chunk_size(s: &str) -> Result<usize, String> {
    let size: usize = s
        .parse()
        .map_err(|e| format!("`{s}` is not a byte count: {e}"))?;
    if size == 0 {
        return Err("chunk size must be greater than 0".to_string());
    }
    Ok(size)
}
