//! The `pixbatch run` command: filter every image in a directory.

mod setup;
mod summary;
pub mod types;

pub use types::{FilterArg, ReportFormatArg};

use clap::Args;
use indicatif::ProgressBar;
use pixbatch_core::{Config, EventSink, FileDiscovery, Pixbatch, ReportWriter, RunReport};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use setup::apply_overrides;
use summary::{create_progress_bar, print_summary, progress_events};

/// Arguments for the `run` command.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Directory of images to process [default: images]
    pub input: Option<PathBuf>,

    /// Directory for filtered images [default: output]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Filter to apply [default: grayscale]
    #[arg(short, long, value_enum)]
    pub filter: Option<FilterArg>,

    /// Number of parallel workers [default: logical core count]
    #[arg(short, long, value_parser = parse_positive)]
    pub workers: Option<usize>,

    /// Max raw images buffered ahead of the workers
    #[arg(long, value_parser = parse_positive)]
    pub ingress_capacity: Option<usize>,

    /// Max filtered images buffered ahead of the saver
    #[arg(long, value_parser = parse_positive)]
    pub egress_capacity: Option<usize>,

    /// Gaussian sigma for the blur filter
    #[arg(long)]
    pub blur_sigma: Option<f32>,

    /// Write a machine-readable run report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "json")]
    pub report_format: ReportFormatArg,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Parse a count that must be at least 1.
fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Execute the run command.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args)?;
    let runner = Pixbatch::new(config)?;

    let files = runner.discover()?;
    if files.is_empty() {
        tracing::warn!(
            "No supported image files found in {:?}",
            runner.config().input_dir()
        );
    } else {
        tracing::info!(
            "Found {} image(s) to process ({} bytes)",
            files.len(),
            FileDiscovery::total_size(&files)
        );
    }

    let progress = if args.no_progress || files.is_empty() {
        ProgressBar::hidden()
    } else {
        create_progress_bar(files.len() as u64)
    };
    let events: EventSink = progress_events(progress.clone());

    let paths = files.into_iter().map(|f| f.path).collect();
    let report = runner.run_files(paths, events).await?;
    progress.finish_and_clear();

    if let Some(path) = &args.report {
        write_report(path, args.report_format, &report)?;
        tracing::info!("Report written to {:?}", path);
    }

    print_summary(&report);
    Ok(())
}

/// Write the run report to `path` in the chosen format.
fn write_report(path: &Path, format: ReportFormatArg, report: &RunReport) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = ReportWriter::new(BufWriter::new(file), format.into());
    writer.write_report(report)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixbatch_core::{FailedItem, Stage};

    #[test]
    fn run_args_default_leaves_config_untouched() {
        let args = RunArgs::default();
        assert!(args.input.is_none());
        assert!(args.output.is_none());
        assert!(args.filter.is_none());
        assert!(args.workers.is_none());
        assert!(!args.no_progress);
        assert!(matches!(args.report_format, ReportFormatArg::Json));
    }

    #[test]
    fn write_report_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.jsonl");
        let report = RunReport {
            discovered: 2,
            saved: vec!["a.jpg".to_string()],
            failures: vec![FailedItem::new("c.jpg", Stage::Transform, "corrupt")],
            ..Default::default()
        };

        write_report(&path, ReportFormatArg::Jsonl, &report).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("c.jpg"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn execute_processes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("images");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("broken.png"), b"not a png").unwrap();

        let args = RunArgs {
            input: Some(input),
            output: Some(dir.path().join("output")),
            workers: Some(2),
            report: Some(dir.path().join("report.json")),
            no_progress: true,
            ..RunArgs::default()
        };

        // Per-item failures never fail the command.
        execute(args, Config::default()).await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("report.json")).unwrap();
        let report: RunReport = serde_json::from_str(&content).unwrap();
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].name, "broken.png");
        assert!(dir.path().join("output").is_dir());
    }

    #[test]
    fn parse_positive_rejects_zero() {
        assert_eq!(parse_positive("4"), Ok(4));
        assert!(parse_positive("0").is_err());
        assert!(parse_positive("many").is_err());
    }
}
