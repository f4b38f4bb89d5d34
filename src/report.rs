use std::fmt::Write as _;
use std::io::{self, Write};

use clap::ValueEnum;

use crate::error::SinkError;
use crate::models::dto::WindowReportDTO;
use crate::pipeline::{AlertSink, WindowReport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per window.
    Json,
}

/// Operator-facing rendering: features in report order, then alert labels.
pub fn render_text(report: &WindowReport) -> String {
    let snapshot = &report.snapshot;
    let mut out = String::from("\nCaptured features:\n");
    for (feature, value) in snapshot.features() {
        let _ = writeln!(out, " - {feature}: {value}");
    }
    let _ = writeln!(
        out,
        " - elapsed_time: {:.3}",
        snapshot.elapsed_time.as_secs_f64()
    );

    if report.alerts.is_empty() {
        out.push_str("No anomalies detected\n");
    } else {
        out.push_str("\nAnomalies detected:\n");
        for alert in &report.alerts {
            let _ = writeln!(out, "- {}", alert.label());
        }
    }
    out
}

pub fn render_json(report: &WindowReport) -> Result<String, SinkError> {
    Ok(serde_json::to_string(&WindowReportDTO::from(report))?)
}

pub struct ConsoleSink<W: Write> {
    out: W,
    format: OutputFormat,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        ConsoleSink { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AlertSink for ConsoleSink<W> {
    fn deliver(&mut self, report: &WindowReport) -> Result<(), SinkError> {
        match self.format {
            OutputFormat::Text => self.out.write_all(render_text(report).as_bytes())?,
            OutputFormat::Json => writeln!(self.out, "{}", render_json(report)?)?,
        }
        self.out.flush()?;
        Ok(())
    }
}
