//! Progress bar and end-of-run summary.

use indicatif::{ProgressBar, ProgressStyle};
use pixbatch_core::{EventSink, RunReport};
use std::time::Instant;

/// Create a progress bar for batch processing.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}

/// Event sink that advances `progress` once per finished item.
pub fn progress_events(progress: ProgressBar) -> EventSink {
    let start = Instant::now();
    EventSink::new(move |event| {
        if !event.is_terminal() {
            return;
        }
        progress.inc(1);
        let elapsed = start.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let rate = progress.position() as f64 / elapsed;
            progress.set_message(format!("{:.1} img/sec", rate));
        }
    })
}

/// Print a formatted summary table after the run.
pub fn print_summary(report: &RunReport) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Filter:       {:>8}", report.filter);
    eprintln!("    Workers:      {:>8}", report.workers());
    eprintln!("    Succeeded:    {:>8}", report.succeeded());
    if report.failed() > 0 {
        eprintln!("    Failed:       {:>8}", report.failed());
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", report.discovered);
    eprintln!("    Duration:     {:>7.1}s", report.total_seconds);
    eprintln!("    Rate:         {:>7.1} img/sec", report.images_per_second());
    eprintln!("  ====================================");

    if report.failed() > 0 {
        eprintln!();
        eprintln!("  Failed items:");
        for failure in &report.failures {
            eprintln!("    {} [{}] {}", failure.name, failure.stage, failure.reason);
        }
    }
}
