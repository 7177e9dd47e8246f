//! Export driver: hands each normalized subject track to the host and
//! collects a per-subject outcome. One subject failing never stops the rest.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::assembler::GlobalTimeline;
use crate::config::Config;
use crate::data::{SubjectTrack, TrackSet};
use crate::error::DemoCamError;
use crate::host::{AnimationHost, ExportOptions, HostError};
use crate::ids::CameraId;

/// Camera object name for a subject.
pub fn camera_name(subject_id: &str) -> String {
    format!("Cam_{subject_id}")
}

/// Clip (action) name attached to a subject's camera.
pub fn clip_name(subject_id: &str) -> String {
    format!("{}_Action", camera_name(subject_id))
}

/// File stem for a subject; path separators and other characters that are
/// invalid in file names on common platforms become `_`.
pub fn file_stem(subject_id: &str) -> String {
    camera_name(subject_id)
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Output path for a claimed stem inside `out_dir`.
pub fn output_path(out_dir: &Path, stem: &str, extension: &str) -> PathBuf {
    out_dir.join(format!("{stem}.{extension}"))
}

/// Hands out one file name per subject within a run.
///
/// Distinct ids can sanitize to the same stem (`a/b` and `a_b`). The first
/// subject keeps the plain stem; later ones get `~2`, `~3`, ... in creation
/// order. Stems are compared case-insensitively so the result also holds on
/// case-folding filesystems.
#[derive(Debug, Default)]
pub struct StemRegistry {
    taken: HashSet<String>,
}

impl StemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, subject_id: &str) -> String {
        let base = file_stem(subject_id);
        let mut stem = base.clone();
        let mut n = 1u32;
        while !self.taken.insert(stem.to_lowercase()) {
            n += 1;
            stem = format!("{base}~{n}");
        }
        if n > 1 {
            warn!(
                subject = subject_id,
                file_stem = %stem,
                "file name already taken; disambiguated"
            );
        }
        stem
    }
}

/// Result of one subject's export.
#[derive(Debug)]
pub struct SubjectExport {
    pub subject_id: String,
    pub path: PathBuf,
    pub result: Result<(), DemoCamError>,
}

impl SubjectExport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes in subject creation order.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub outcomes: Vec<SubjectExport>,
}

/// Serializable digest of a report.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ExportDigest {
    pub exported: Vec<PathBuf>,
    pub failed: Vec<(String, String)>,
}

impl ExportReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &SubjectExport> {
        self.outcomes.iter().filter(|o| o.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &SubjectExport> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(SubjectExport::is_ok)
    }

    pub fn digest(&self) -> ExportDigest {
        ExportDigest {
            exported: self.succeeded().map(|o| o.path.clone()).collect(),
            failed: self
                .failed()
                .filter_map(|o| {
                    o.result
                        .as_ref()
                        .err()
                        .map(|e| (o.subject_id.clone(), e.to_string()))
                })
                .collect(),
        }
    }
}

fn export_error(subject_id: &str, err: HostError) -> DemoCamError {
    DemoCamError::Export {
        subject: subject_id.to_owned(),
        reason: err.to_string(),
    }
}

/// Create the subject's camera and write its channels.
fn bind_track<H: AnimationHost>(host: &mut H, track: &SubjectTrack) -> Result<CameraId, HostError> {
    let camera = host.create_camera(
        &camera_name(&track.subject_id),
        &clip_name(&track.subject_id),
    )?;
    for (channel, keys) in track.channels.iter() {
        if keys.is_empty() {
            continue;
        }
        host.insert_keyframes(camera, channel, keys)?;
    }
    Ok(camera)
}

/// Export every subject in creation order.
///
/// Cameras are created and keyed first at the source tickrate, then the
/// scene is switched to the export rate and each camera is exported alone.
/// Every subject gets its own file, see [`StemRegistry`]. Leaving nothing
/// behind on a failed export is the host's job; the driver never deletes files.
pub fn export_all<H: AnimationHost>(
    host: &mut H,
    tracks: &TrackSet,
    timeline: &GlobalTimeline,
    cfg: &Config,
    out_dir: &Path,
) -> ExportReport {
    let mut report = ExportReport::default();
    let ext = host.file_extension().to_owned();
    let mut stems = StemRegistry::new();

    host.set_scene_fps(cfg.tickrate);
    let mut bound: Vec<(&SubjectTrack, PathBuf, Result<CameraId, HostError>)> =
        Vec::with_capacity(tracks.len());
    for track in tracks.iter() {
        let path = output_path(out_dir, &stems.claim(&track.subject_id), &ext);
        let camera = bind_track(host, track);
        if camera.is_ok() {
            info!(camera = %camera_name(&track.subject_id), "created camera");
        }
        bound.push((track, path, camera));
    }

    let (start, end) = timeline.frame_range();
    host.set_scene_range(start, end);
    info!(fps = cfg.export_fps, "switching scene rate to export setting");
    host.set_scene_fps(cfg.export_fps);

    let total = bound.len();
    for (i, (track, path, camera)) in bound.into_iter().enumerate() {
        let subject = track.subject_id.as_str();
        info!(
            "exporting ({}/{}) {} -> {}",
            i + 1,
            total,
            camera_name(subject),
            path.display()
        );
        let options = ExportOptions::camera(path.clone(), cfg.export_fps, cfg.frame_step);
        let result = camera
            .and_then(|cam| host.select_only(cam))
            .and_then(|()| host.export_selected(&options))
            .map_err(|err| export_error(subject, err));
        match &result {
            Ok(()) => info!(camera = %camera_name(subject), "finished"),
            Err(err) => error!(%err, "export failed; continuing with remaining subjects"),
        }
        report.outcomes.push(SubjectExport {
            subject_id: subject.to_owned(),
            path,
            result,
        });
    }
    report
}
