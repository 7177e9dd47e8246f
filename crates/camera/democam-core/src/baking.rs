//! Baking API: resample a subject's channels at a fixed frame step over the
//! scene range.

use serde::{Deserialize, Serialize};

use crate::data::{Channel, ChannelSet};
use crate::error::{DemoCamError, Result};
use crate::sampling::sample_channel;

/// Tolerance when deciding whether the last step still lands inside the range.
const STEP_EPS: f64 = 1e-9;

/// Upper bound on samples per baked clip (about three days of 64 Hz ticks).
pub const MAX_BAKED_FRAMES: usize = 1 << 24;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BakingConfig {
    /// Frame rate (Hz) that frames are played back at.
    pub fps: u32,
    /// Frames between baked samples.
    pub frame_step: f64,
    /// Inclusive scene range in frames.
    pub frame_start: i64,
    pub frame_end: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BakedChannel {
    pub channel: Channel,
    /// One value per entry of `BakedClip::frames`.
    pub values: Vec<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BakedClip {
    pub name: String,
    pub fps: u32,
    pub frame_step: f64,
    pub frame_start: i64,
    pub frame_end: i64,
    /// Sampled frame numbers.
    pub frames: Vec<f64>,
    pub channels: Vec<BakedChannel>,
}

impl BakedClip {
    /// Seconds from the first frame to the last baked frame.
    pub fn duration_secs(&self) -> f64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(a), Some(b)) => (b - a) / self.fps as f64,
            _ => 0.0,
        }
    }

    pub fn channel(&self, channel: Channel) -> Option<&BakedChannel> {
        self.channels.iter().find(|c| c.channel == channel)
    }
}

/// Frame numbers `start, start + step, …` up to and including `end`.
pub fn bake_frames(cfg: &BakingConfig) -> Result<Vec<f64>> {
    if !cfg.frame_step.is_finite() || cfg.frame_step <= 0.0 {
        return Err(DemoCamError::invalid_config(format!(
            "bake step must be > 0 (got {})",
            cfg.frame_step
        )));
    }
    if cfg.frame_end < cfg.frame_start {
        return Ok(Vec::new());
    }
    let span = (i128::from(cfg.frame_end) - i128::from(cfg.frame_start)) as f64;
    let steps = (span / cfg.frame_step + STEP_EPS).floor();
    if steps >= MAX_BAKED_FRAMES as f64 {
        return Err(DemoCamError::TooManyFrames {
            frames: steps + 1.0,
            limit: MAX_BAKED_FRAMES,
        });
    }
    let count = steps as usize + 1;
    Ok((0..count)
        .map(|i| cfg.frame_start as f64 + i as f64 * cfg.frame_step)
        .collect())
}

/// Bake all six channels of a camera. Empty channels are skipped.
pub fn bake_channels(name: &str, channels: &ChannelSet, cfg: &BakingConfig) -> Result<BakedClip> {
    let frames = bake_frames(cfg)?;
    let baked = channels
        .iter()
        .filter(|(_, keys)| !keys.is_empty())
        .map(|(channel, keys)| BakedChannel {
            channel,
            values: frames
                .iter()
                .filter_map(|&f| sample_channel(keys, f))
                .collect(),
        })
        .collect();

    Ok(BakedClip {
        name: name.to_owned(),
        fps: cfg.fps.max(1),
        frame_step: cfg.frame_step,
        frame_start: cfg.frame_start,
        frame_end: cfg.frame_end,
        frames,
        channels: baked,
    })
}
