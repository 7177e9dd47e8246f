//! democam CLI
//!
//! Turns a replay POV tick log into one camera clip per player.
//!
//! # Usage
//!
//! ```bash
//! # Write Cam_<player>.json clips into ./cams
//! democam --input all_ticks.csv --output cams
//!
//! # Load settings from a file, override the export rate
//! democam -i round_3.csv -o cams --config democam.json --export-fps 30
//!
//! # Show what would be exported; no clip files are written
//! democam -i all_ticks.csv -o cams --dry-run
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use democam_core::{
    export::ExportDigest, host::HostCall, Config, JsonClipHost, MalformedRowPolicy,
    RecordingHost, RunSummary,
};
use serde::Serialize;

/// Replay POV log to camera clip exporter
#[derive(Parser, Debug)]
#[command(name = "democam")]
#[command(author, version, about = "Bake per-player replay cameras into animation clips")]
pub struct Cli {
    /// Tick log (CSV) to read
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory that receives one clip per player (created if absent)
    #[arg(short, long)]
    pub output: PathBuf,

    /// JSON config file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Source tickrate (also the scene rate while keying)
    #[arg(long)]
    pub tickrate: Option<u32>,

    /// Frame rate stamped on exported clips
    #[arg(long)]
    pub export_fps: Option<u32>,

    /// Bake step in frames
    #[arg(long)]
    pub frame_step: Option<f64>,

    /// Eye height above the logged origin, in engine units
    #[arg(long)]
    pub head_offset: Option<f64>,

    /// Import scale used to convert engine units into scene units
    #[arg(long)]
    pub import_scale: Option<f64>,

    /// Eye drop at full crouch, in engine units
    #[arg(long)]
    pub crouch_offset: Option<f64>,

    /// Drop malformed rows with a warning instead of aborting
    #[arg(long)]
    pub skip_malformed: bool,

    /// Accept logs without stance-flag columns
    #[arg(long)]
    pub allow_missing_flags: bool,

    /// Run the pipeline against an in-memory host and print the calls
    #[arg(long)]
    pub dry_run: bool,

    /// Summary format printed on stdout
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Summary output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::from_path(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(v) = self.tickrate {
            cfg.tickrate = v;
        }
        if let Some(v) = self.export_fps {
            cfg.export_fps = v;
        }
        if let Some(v) = self.frame_step {
            cfg.frame_step = v;
        }
        if let Some(v) = self.head_offset {
            cfg.head_offset = v;
        }
        if let Some(v) = self.import_scale {
            cfg.import_scale = v;
        }
        if let Some(v) = self.crouch_offset {
            cfg.crouch_offset = v;
        }
        if self.skip_malformed {
            cfg.malformed_rows = MalformedRowPolicy::Skip;
        }
        if self.allow_missing_flags {
            cfg.allow_missing_flags = true;
        }
        cfg.validate().context("validating configuration")?;
        Ok(cfg)
    }
}

/// What gets printed after a run.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub subjects: Vec<String>,
    pub frame_range: Option<(i64, i64)>,
    #[serde(flatten)]
    pub exports: ExportDigest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_calls: Option<Vec<HostCall>>,
}

impl Outcome {
    fn from_summary(summary: &RunSummary, host_calls: Option<Vec<HostCall>>) -> Self {
        Self {
            rows_read: summary.rows_read,
            rows_skipped: summary.rows_skipped,
            subjects: summary.subjects.clone(),
            frame_range: summary.timeline.map(|t| t.frame_range()),
            exports: summary.report.digest(),
            host_calls,
        }
    }

    pub fn failed(&self) -> usize {
        self.exports.failed.len()
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("serializing run summary")
            }
            OutputFormat::Text => {
                let mut out = String::new();
                out.push_str(&format!(
                    "rows: {} read, {} skipped\nsubjects: {}\n",
                    self.rows_read,
                    self.rows_skipped,
                    self.subjects.len()
                ));
                if let Some((start, end)) = self.frame_range {
                    out.push_str(&format!("frames: {start}..={end}\n"));
                }
                for path in &self.exports.exported {
                    out.push_str(&format!("[OK] {}\n", path.display()));
                }
                for (subject, reason) in &self.exports.failed {
                    out.push_str(&format!("[FAILED] {subject}: {reason}\n"));
                }
                if let Some(calls) = &self.host_calls {
                    out.push_str(&format!("host calls: {}\n", calls.len()));
                }
                Ok(out)
            }
        }
    }
}

/// Run the pipeline for parsed arguments.
pub fn execute(cli: &Cli) -> Result<Outcome> {
    let cfg = cli.resolve_config()?;
    tracing::debug!(?cfg, "resolved configuration");
    if cli.dry_run {
        let mut host = RecordingHost::new();
        let summary = democam_core::run(&cli.input, &cli.output, &cfg, &mut host)?;
        Ok(Outcome::from_summary(&summary, Some(host.calls)))
    } else {
        let mut host = JsonClipHost::new();
        let summary = democam_core::run(&cli.input, &cli.output, &cfg, &mut host)?;
        Ok(Outcome::from_summary(&summary, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "democam",
            "-i",
            "in.csv",
            "-o",
            "out",
            "--export-fps",
            "30",
            "--skip-malformed",
        ]);
        let cfg = cli.resolve_config().expect("config");
        assert_eq!(cfg.export_fps, 30);
        assert_eq!(cfg.tickrate, 64);
        assert_eq!(cfg.malformed_rows, MalformedRowPolicy::Skip);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let cli = Cli::parse_from(["democam", "-i", "a", "-o", "b", "--frame-step", "0"]);
        assert!(cli.resolve_config().is_err());
    }
}
