//! Run report output in JSON or JSON Lines.
//!
//! JSON writes the whole [`RunReport`] as one document. JSON Lines writes one
//! [`ItemOutcome`] per input file, which is easier to grep or stream into
//! other tools.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::types::{RunReport, Stage};

/// Report format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// The full report as a single JSON object
    Json,
    /// One outcome object per line (newline-delimited JSON)
    JsonLines,
}

/// Final status of one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ItemOutcome {
    Saved { name: String },
    Failed { name: String, stage: Stage, reason: String },
}

impl ItemOutcome {
    /// All outcomes of a run: saved items first, then failures.
    pub fn from_report(report: &RunReport) -> Vec<Self> {
        report
            .saved
            .iter()
            .map(|name| ItemOutcome::Saved { name: name.clone() })
            .chain(report.failures.iter().map(|f| ItemOutcome::Failed {
                name: f.name.clone(),
                stage: f.stage,
                reason: f.reason.clone(),
            }))
            .collect()
    }
}

/// A writer that serializes run reports.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: ReportFormat,
    records_written: usize,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W, format: ReportFormat) -> Self {
        Self {
            writer,
            format,
            records_written: 0,
        }
    }

    /// Write a run report in the configured format.
    pub fn write_report(&mut self, report: &RunReport) -> io::Result<()> {
        match self.format {
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut self.writer, report)
                    .map_err(io::Error::other)?;
                writeln!(self.writer)?;
                self.records_written += 1;
            }
            ReportFormat::JsonLines => {
                for outcome in ItemOutcome::from_report(report) {
                    serde_json::to_writer(&mut self.writer, &outcome).map_err(io::Error::other)?;
                    writeln!(self.writer)?;
                    self.records_written += 1;
                }
            }
        }
        Ok(())
    }

    /// Get the number of records written.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
