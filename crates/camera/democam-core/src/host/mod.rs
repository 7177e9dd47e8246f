//! Boundary to the animation/asset host.
//!
//! The pipeline only needs four capabilities from a host: create a camera
//! with an attached clip, write keyframes into its channels, set the scene
//! range/rate, and export one selected object to a file. Everything about the
//! container format lives behind this trait.

pub mod json_clip;
pub mod recording;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::data::{Channel, Keyframe};
use crate::ids::CameraId;

pub use json_clip::JsonClipHost;
pub use recording::{HostCall, RecordingHost};

/// Signed world/target axis used by export axis conventions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "X")]
    X,
    #[serde(rename = "Y")]
    Y,
    #[serde(rename = "Z")]
    Z,
    #[serde(rename = "-X")]
    NegX,
    #[serde(rename = "-Y")]
    NegY,
    #[serde(rename = "-Z")]
    NegZ,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
            Axis::NegX => "-X",
            Axis::NegY => "-Y",
            Axis::NegZ => "-Z",
        };
        f.write_str(s)
    }
}

/// How object/unit scale is handled on export.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Bake every scale (unit and object) into the exported transforms.
    #[default]
    ApplyAll,
}

/// Object categories an export may include.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Camera,
}

/// Parameters for one per-object export call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub path: PathBuf,
    pub fps: u32,
    pub frame_step: f64,
    pub axis_forward: Axis,
    pub axis_up: Axis,
    pub scale_mode: ScaleMode,
    pub object_kinds: Vec<ObjectKind>,
    /// Export only the selected object.
    pub use_selection: bool,
}

impl ExportOptions {
    /// Camera-only export with forward = −Z, up = Y, all scale applied.
    pub fn camera(path: PathBuf, fps: u32, frame_step: f64) -> Self {
        Self {
            path,
            fps,
            frame_step,
            axis_forward: Axis::NegZ,
            axis_up: Axis::Y,
            scale_mode: ScaleMode::ApplyAll,
            object_kinds: vec![ObjectKind::Camera],
            use_selection: true,
        }
    }
}

/// Errors a host may report.
#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error("unknown {0}")]
    UnknownCamera(CameraId),
    #[error("nothing selected for export")]
    NothingSelected,
    #[error("camera name already in use: {0}")]
    DuplicateName(String),
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Narrow interface the export driver talks to.
///
/// Calls are made from a single thread through `&mut self`; hosts keep their
/// own selection state.
pub trait AnimationHost {
    /// Extension (without dot) of the files written by `export_selected`.
    fn file_extension(&self) -> &str;

    /// Create a camera object named `name` with an empty clip named `clip_name`.
    fn create_camera(&mut self, name: &str, clip_name: &str) -> Result<CameraId, HostError>;

    /// Add keys to one channel. Keys may arrive in any order; the host sorts
    /// before the clip is finalized.
    fn insert_keyframes(
        &mut self,
        camera: CameraId,
        channel: Channel,
        keys: &[Keyframe],
    ) -> Result<(), HostError>;

    /// Inclusive scene frame range.
    fn set_scene_range(&mut self, start: i64, end: i64);

    fn set_scene_fps(&mut self, fps: u32);

    /// Make `camera` the only selected (and active) object.
    fn select_only(&mut self, camera: CameraId) -> Result<(), HostError>;

    /// Export the current selection.
    fn export_selected(&mut self, options: &ExportOptions) -> Result<(), HostError>;
}
