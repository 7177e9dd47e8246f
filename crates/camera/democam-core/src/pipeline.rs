//! End-to-end run: validate paths, parse, synthesize, normalize, export.

use std::path::Path;

use tracing::{info, warn};

use crate::assembler::{assemble, GlobalTimeline, SynthesisParams};
use crate::config::Config;
use crate::data::TrackSet;
use crate::error::{DemoCamError, PathRole, Result};
use crate::export::{export_all, ExportReport};
use crate::host::AnimationHost;
use crate::parser::{parse_path, ParseOptions, ParsedLog};

/// What a run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub subjects: Vec<String>,
    /// None when the log held no rows.
    pub timeline: Option<GlobalTimeline>,
    pub report: ExportReport,
}

impl RunSummary {
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// Tracks ready for export, with the timeline that was applied.
#[derive(Debug)]
pub struct PreparedTracks {
    pub tracks: TrackSet,
    pub timeline: Option<GlobalTimeline>,
    pub rows_read: usize,
    pub rows_skipped: usize,
}

/// Synthesize and normalize an already-parsed log.
pub fn prepare(parsed: ParsedLog, cfg: &Config) -> Result<PreparedTracks> {
    let ParsedLog {
        mut tracks,
        rows_read,
        rows_skipped,
        ..
    } = parsed;
    let timeline = assemble(&mut tracks, SynthesisParams::from(cfg))?;
    Ok(PreparedTracks {
        tracks,
        timeline,
        rows_read,
        rows_skipped,
    })
}

fn check_output_dir(out_dir: &Path) -> Result<()> {
    if out_dir.as_os_str().is_empty() || (out_dir.exists() && !out_dir.is_dir()) {
        return Err(DemoCamError::InputNotFound {
            role: PathRole::OutputDir,
            path: out_dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Run the whole pipeline against `host`.
pub fn run<H: AnimationHost>(
    input: &Path,
    out_dir: &Path,
    cfg: &Config,
    host: &mut H,
) -> Result<RunSummary> {
    cfg.validate()?;
    if !input.is_file() {
        return Err(DemoCamError::InputNotFound {
            role: PathRole::InputLog,
            path: input.to_path_buf(),
        });
    }
    check_output_dir(out_dir)?;

    info!("starting camera export");
    let parsed = parse_path(input, ParseOptions::from(cfg))?;
    let prepared = prepare(parsed, cfg)?;
    info!(
        subjects = prepared.tracks.len(),
        rows = prepared.tracks.row_count(),
        "camera tracks assembled"
    );

    let mut summary = RunSummary {
        rows_read: prepared.rows_read,
        rows_skipped: prepared.rows_skipped,
        subjects: prepared.tracks.subject_ids().map(str::to_owned).collect(),
        timeline: prepared.timeline,
        report: ExportReport::default(),
    };

    let Some(timeline) = prepared.timeline else {
        warn!(path = %input.display(), "no rows parsed; nothing to export");
        return Ok(summary);
    };

    std::fs::create_dir_all(out_dir).map_err(|source| DemoCamError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    summary.report = export_all(host, &prepared.tracks, &timeline, cfg, out_dir);
    let failed = summary.report.failed().count();
    if failed == 0 {
        info!(cameras = summary.subjects.len(), "all cameras exported");
    } else {
        warn!(
            failed,
            total = summary.subjects.len(),
            "some cameras failed to export"
        );
    }
    Ok(summary)
}
