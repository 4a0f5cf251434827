use std::time::Duration;

use dvstrip_engine::ScanProgress;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner:.blue} [{bar:40.cyan/blue}] {percent:>3}% {msg}";

/// Terminal progress bar fed by scan progress callbacks.
#[derive(Clone)]
pub struct ScanProgressBar {
    bar: ProgressBar,
}

impl ScanProgressBar {
    pub fn new(visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        Self { bar }
    }

    pub fn update(&self, progress: &ScanProgress) {
        self.bar.set_length(progress.total_bytes);
        self.bar.set_position(progress.bytes_consumed);
        self.bar.set_message(status_message(progress));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn status_message(progress: &ScanProgress) -> String {
    format!(
        "ETA {} {} DV OBU",
        format_eta(progress.eta()),
        progress.dolby_vision_obus
    )
}

fn format_eta(eta: Option<Duration>) -> String {
    match eta {
        // whole seconds keep the message from flickering
        Some(eta) => HumanDuration(Duration::from_secs(eta.as_secs())).to_string(),
        None => "--".to_string(),
    }
}
