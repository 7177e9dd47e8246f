//! Track assembly: rows → six keyframe channels per subject, then one global
//! pass that shifts every subject onto a shared timeline starting at tick 1.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::crouch::{CrouchMachine, TransitionDurations};
use crate::data::{Channel, SubjectTrack, TrackSet};
use crate::error::{DemoCamError, Result};
use crate::orientation::camera_euler;

/// Tick that the earliest sample of a run lands on after normalization.
pub const TIMELINE_ORIGIN: i64 = 1;

/// Offsets in working length units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SynthesisParams {
    /// Added to every Z sample.
    pub head_offset: f64,
    /// Vertical drop at full crouch.
    pub crouch_depth: f64,
}

impl From<&Config> for SynthesisParams {
    fn from(cfg: &Config) -> Self {
        Self {
            head_offset: cfg.head_offset_units(),
            crouch_depth: cfg.crouch_depth_units(),
        }
    }
}

/// Fill a subject's channels from its rows. Existing keys are replaced.
pub fn synthesize_track(track: &mut SubjectTrack, params: SynthesisParams) {
    let durations = track.durations_or_init(TransitionDurations::infer);
    let mut machine = CrouchMachine::new(durations, params.crouch_depth);

    track.channels.clear();
    for row in &track.rows {
        let t = row.tick;
        let rot = camera_euler(row.yaw, row.pitch);
        let drop = machine.advance(&row.flags);
        let z = row.position.z + params.head_offset - drop;

        track.channels.push(Channel::LocX, t, row.position.x);
        track.channels.push(Channel::LocY, t, row.position.y);
        track.channels.push(Channel::LocZ, t, z);
        track.channels.push(Channel::RotX, t, rot.x);
        track.channels.push(Channel::RotY, t, rot.y);
        track.channels.push(Channel::RotZ, t, rot.z);
    }
    debug!(
        subject = %track.subject_id,
        rows = track.rows.len(),
        crouch_ticks = durations.crouch,
        uncrouch_ticks = durations.uncrouch,
        final_state = ?machine.state(),
        "synthesized camera channels"
    );
}

/// Synthesize every track in creation order.
pub fn synthesize(tracks: &mut TrackSet, params: SynthesisParams) {
    for track in tracks.iter_mut() {
        synthesize_track(track, params);
    }
}

/// Tick range shared by all subjects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalTimeline {
    pub min_tick: i64,
    pub max_tick: i64,
    /// `TIMELINE_ORIGIN - min_tick`
    pub tick_offset: i64,
}

impl GlobalTimeline {
    /// Scan every channel of every subject. `Ok(None)` when there are no keys.
    ///
    /// Fails with `TickOverflow` when the offset or the shifted last tick
    /// does not fit in an `i64`; a successful scan guarantees every key can be
    /// shifted.
    pub fn scan(tracks: &TrackSet) -> Result<Option<Self>> {
        let Some((min_tick, max_tick)) = tracks
            .iter()
            .filter_map(|t| t.channels.tick_bounds())
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
        else {
            return Ok(None);
        };
        TIMELINE_ORIGIN
            .checked_sub(min_tick)
            .filter(|offset| max_tick.checked_add(*offset).is_some())
            .map(|tick_offset| {
                Some(Self {
                    min_tick,
                    max_tick,
                    tick_offset,
                })
            })
            .ok_or(DemoCamError::TickOverflow { min_tick, max_tick })
    }

    /// Last frame after shifting; also the scene duration in frames.
    #[inline]
    pub fn duration(&self) -> i64 {
        self.max_tick.saturating_add(self.tick_offset)
    }

    /// Inclusive scene frame range after shifting.
    #[inline]
    pub fn frame_range(&self) -> (i64, i64) {
        (TIMELINE_ORIGIN, self.duration())
    }
}

/// Shift every subject's channels so the earliest key sits on tick 1.
/// Returns the timeline that was applied, or None for an empty set.
/// Running it again on normalized data applies a zero offset.
pub fn normalize(tracks: &mut TrackSet) -> Result<Option<GlobalTimeline>> {
    let Some(timeline) = GlobalTimeline::scan(tracks)? else {
        return Ok(None);
    };
    if timeline.tick_offset != 0 {
        for track in tracks.iter_mut() {
            track.channels.shift_ticks(timeline.tick_offset);
        }
    }
    let (start, end) = timeline.frame_range();
    info!(
        min_tick = timeline.min_tick,
        max_tick = timeline.max_tick,
        offset = timeline.tick_offset,
        "timeline normalized to frames {start}..={end}"
    );
    Ok(Some(timeline))
}

/// Synthesize and normalize in one call.
pub fn assemble(tracks: &mut TrackSet, params: SynthesisParams) -> Result<Option<GlobalTimeline>> {
    synthesize(tracks, params);
    normalize(tracks)
}
