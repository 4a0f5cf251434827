mod cli;
mod error;
mod progress;

use std::process;

use clap::Parser;
use dvstrip_engine::{ScanConfig, ScanProgress, ScanStats, scan_file};
use mimalloc::MiMalloc;
use tracing::{Level, debug};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::{
    cli::Args,
    error::{AppError, Result},
    progress::ScanProgressBar,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        if let Some(hint) = e.hint() {
            eprintln!("{hint}");
        }
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet)?;
    debug!(?args, "Parsed arguments");

    let config = ScanConfig::default().with_chunk_size(args.chunk_size);
    let progress = ScanProgressBar::new(args.show_progress());

    let callback = {
        let progress = progress.clone();
        move |p: &ScanProgress| progress.update(p)
    };
    let result = scan_file(&args.input, args.output.as_deref(), &config, callback);
    progress.finish();

    let stats = result?;
    print_summary(&stats, args.output.is_some());
    Ok(())
}

fn print_summary(stats: &ScanStats, filtered: bool) {
    println!("total OBU read: {}", stats.obus);
    println!("total DV OBU read: {}", stats.dolby_vision_obus);
    println!(
        "total processing time: {:.2} seconds",
        stats.elapsed.as_secs_f64()
    );
    if filtered {
        println!("bytes written: {}", stats.bytes_written);
    }
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}
