//! Host that writes each exported camera as a baked JSON clip.
//!
//! Layout follows the stored-animation schema: `duration` in milliseconds,
//! keypoint `stamp`s normalized to [0,1] over the clip, one track per
//! animated component. Export metadata (rate, step, axes, scale mode) rides
//! along as extra top-level keys.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use super::{AnimationHost, Axis, ExportOptions, HostError, ScaleMode};
use crate::baking::{bake_channels, BakedClip, BakingConfig};
use crate::data::{Channel, ChannelSet, Keyframe};
use crate::ids::{CameraId, IdAllocator};

#[derive(Debug)]
struct ClipCamera {
    name: String,
    clip: String,
    channels: ChannelSet,
}

/// Writes `<name>.json` clips.
#[derive(Debug, Default)]
pub struct JsonClipHost {
    ids: IdAllocator,
    cameras: Vec<ClipCamera>,
    scene_range: Option<(i64, i64)>,
    scene_fps: Option<u32>,
    selected: Option<CameraId>,
}

impl JsonClipHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene_fps(&self) -> Option<u32> {
        self.scene_fps
    }

    fn camera(&self, id: CameraId) -> Result<&ClipCamera, HostError> {
        self.cameras
            .get(id.0 as usize)
            .ok_or(HostError::UnknownCamera(id))
    }
}

impl AnimationHost for JsonClipHost {
    fn file_extension(&self) -> &str {
        "json"
    }

    fn create_camera(&mut self, name: &str, clip_name: &str) -> Result<CameraId, HostError> {
        if self.cameras.iter().any(|c| c.name == name) {
            return Err(HostError::DuplicateName(name.to_owned()));
        }
        let id = self.ids.alloc_camera();
        self.cameras.push(ClipCamera {
            name: name.to_owned(),
            clip: clip_name.to_owned(),
            channels: ChannelSet::default(),
        });
        Ok(id)
    }

    fn insert_keyframes(
        &mut self,
        camera: CameraId,
        channel: Channel,
        keys: &[Keyframe],
    ) -> Result<(), HostError> {
        self.camera(camera)?;
        let cam = &mut self.cameras[camera.0 as usize];
        for k in keys {
            cam.channels.push(channel, k.tick, k.value);
        }
        cam.channels.sort();
        Ok(())
    }

    fn set_scene_range(&mut self, start: i64, end: i64) {
        self.scene_range = Some((start, end));
    }

    fn set_scene_fps(&mut self, fps: u32) {
        self.scene_fps = Some(fps);
    }

    fn select_only(&mut self, camera: CameraId) -> Result<(), HostError> {
        self.camera(camera)?;
        self.selected = Some(camera);
        Ok(())
    }

    fn export_selected(&mut self, options: &ExportOptions) -> Result<(), HostError> {
        let id = self.selected.ok_or(HostError::NothingSelected)?;
        let cam = self.camera(id)?;
        let (frame_start, frame_end) = self
            .scene_range
            .ok_or_else(|| HostError::Rejected("scene range not set".into()))?;

        let cfg = BakingConfig {
            fps: options.fps,
            frame_step: options.frame_step,
            frame_start,
            frame_end,
        };
        let baked = bake_channels(&cam.name, &cam.channels, &cfg)
            .map_err(|e| HostError::Rejected(e.to_string()))?;
        let stored = StoredClip::from_baked(&baked, &cam.clip, options);
        write_atomically(&options.path, &stored)?;
        debug!(
            camera = %cam.name,
            path = %options.path.display(),
            frames = baked.frames.len(),
            "wrote clip"
        );
        Ok(())
    }
}

/// Serialize into a temp file next to `path`, then rename over it.
fn write_atomically(path: &Path, clip: &StoredClip) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(&dir)?;
    serde_json::to_writer_pretty(tmp.as_file_mut(), clip)?;
    tmp.as_file_mut().write_all(b"\n")?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ----- JSON schema (serde) -----

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredClip {
    pub id: String,
    pub name: String,
    pub tracks: Vec<StoredTrack>,
    pub groups: serde_json::Value,
    /// Milliseconds.
    pub duration: u64,
    pub fps: u32,
    pub frame_step: f64,
    pub frame_start: i64,
    pub frame_end: i64,
    pub axis_forward: Axis,
    pub axis_up: Axis,
    pub scale_mode: ScaleMode,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredTrack {
    pub id: String,
    pub name: String,
    #[serde(rename = "animatableId")]
    pub animatable_id: String,
    pub points: Vec<StoredPoint>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredPoint {
    pub id: String,
    /// 0..1
    pub stamp: f64,
    pub value: f64,
}

impl StoredClip {
    pub fn from_baked(baked: &BakedClip, clip_name: &str, options: &ExportOptions) -> Self {
        let n = baked.frames.len();
        let stamp = |i: usize| {
            if n > 1 {
                i as f64 / (n - 1) as f64
            } else {
                0.0
            }
        };

        let mut groups = serde_json::Map::new();
        let tracks: Vec<StoredTrack> = baked
            .channels
            .iter()
            .map(|bc| {
                let id = format!("{}.{}", baked.name, bc.channel.name());
                if let Some(ids) = groups
                    .entry(bc.channel.data_path())
                    .or_insert_with(|| serde_json::Value::Array(Vec::new()))
                    .as_array_mut()
                {
                    ids.push(serde_json::Value::String(id.clone()));
                }
                StoredTrack {
                    id,
                    name: bc.channel.name().to_owned(),
                    animatable_id: format!(
                        "{}/{}[{}]",
                        baked.name,
                        bc.channel.data_path(),
                        bc.channel.index()
                    ),
                    points: bc
                        .values
                        .iter()
                        .enumerate()
                        .map(|(i, &value)| StoredPoint {
                            id: format!("k{i}"),
                            stamp: stamp(i),
                            value,
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            id: clip_name.to_owned(),
            name: baked.name.clone(),
            tracks,
            groups: serde_json::Value::Object(groups),
            duration: (baked.duration_secs() * 1000.0).round() as u64,
            fps: baked.fps,
            frame_step: baked.frame_step,
            frame_start: baked.frame_start,
            frame_end: baked.frame_end,
            axis_forward: options.axis_forward,
            axis_up: options.axis_up,
            scale_mode: options.scale_mode,
        }
    }

    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Read a clip previously written by [`JsonClipHost`].
    pub fn read(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_json_str(&text)?)
    }

    pub fn track(&self, channel: Channel) -> Option<&StoredTrack> {
        self.tracks.iter().find(|t| t.name == channel.name())
    }
}
