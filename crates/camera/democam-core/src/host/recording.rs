//! In-memory host that records every call. Used by tests and dry runs.

use std::collections::HashSet;

use serde::Serialize;

use super::{AnimationHost, ExportOptions, HostError};
use crate::data::{Channel, ChannelSet, Keyframe};
use crate::ids::{CameraId, IdAllocator};

/// One call made against the host, in order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum HostCall {
    CreateCamera { name: String, clip: String },
    InsertKeyframes { camera: String, channel: Channel, count: usize },
    SetSceneRange { start: i64, end: i64 },
    SetSceneFps { fps: u32 },
    SelectOnly { camera: String },
    Export { camera: String, options: ExportOptions },
}

#[derive(Clone, Debug, Default)]
pub struct RecordedCamera {
    pub name: String,
    pub clip: String,
    pub channels: ChannelSet,
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    ids: IdAllocator,
    pub cameras: Vec<RecordedCamera>,
    pub calls: Vec<HostCall>,
    pub scene_range: Option<(i64, i64)>,
    pub scene_fps: Option<u32>,
    selected: Option<CameraId>,
    /// Camera names whose export is rejected.
    failing: HashSet<String>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject exports of the camera called `camera_name`.
    pub fn fail_export_of(mut self, camera_name: impl Into<String>) -> Self {
        self.failing.insert(camera_name.into());
        self
    }

    pub fn camera(&self, name: &str) -> Option<&RecordedCamera> {
        self.cameras.iter().find(|c| c.name == name)
    }

    /// Names passed to successful exports, in order.
    pub fn exported(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Export { camera, .. } => Some(camera.as_str()),
                _ => None,
            })
            .collect()
    }

    fn lookup(&self, id: CameraId) -> Result<&RecordedCamera, HostError> {
        self.cameras
            .get(id.0 as usize)
            .ok_or(HostError::UnknownCamera(id))
    }
}

impl AnimationHost for RecordingHost {
    fn file_extension(&self) -> &str {
        "fbx"
    }

    fn create_camera(&mut self, name: &str, clip_name: &str) -> Result<CameraId, HostError> {
        if self.camera(name).is_some() {
            return Err(HostError::DuplicateName(name.to_owned()));
        }
        let id = self.ids.alloc_camera();
        self.cameras.push(RecordedCamera {
            name: name.to_owned(),
            clip: clip_name.to_owned(),
            channels: ChannelSet::default(),
        });
        self.calls.push(HostCall::CreateCamera {
            name: name.to_owned(),
            clip: clip_name.to_owned(),
        });
        Ok(id)
    }

    fn insert_keyframes(
        &mut self,
        camera: CameraId,
        channel: Channel,
        keys: &[Keyframe],
    ) -> Result<(), HostError> {
        let name = self.lookup(camera)?.name.clone();
        let cam = &mut self.cameras[camera.0 as usize];
        for k in keys {
            cam.channels.push(channel, k.tick, k.value);
        }
        cam.channels.sort();
        self.calls.push(HostCall::InsertKeyframes {
            camera: name,
            channel,
            count: keys.len(),
        });
        Ok(())
    }

    fn set_scene_range(&mut self, start: i64, end: i64) {
        self.scene_range = Some((start, end));
        self.calls.push(HostCall::SetSceneRange { start, end });
    }

    fn set_scene_fps(&mut self, fps: u32) {
        self.scene_fps = Some(fps);
        self.calls.push(HostCall::SetSceneFps { fps });
    }

    fn select_only(&mut self, camera: CameraId) -> Result<(), HostError> {
        let name = self.lookup(camera)?.name.clone();
        self.selected = Some(camera);
        self.calls.push(HostCall::SelectOnly { camera: name });
        Ok(())
    }

    fn export_selected(&mut self, options: &ExportOptions) -> Result<(), HostError> {
        let id = self.selected.ok_or(HostError::NothingSelected)?;
        let name = self.lookup(id)?.name.clone();
        if self.failing.contains(&name) {
            return Err(HostError::Rejected(format!("writer refused {name}")));
        }
        self.calls.push(HostCall::Export {
            camera: name,
            options: options.clone(),
        });
        Ok(())
    }
}
