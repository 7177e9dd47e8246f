//! Data model: parsed log rows, per-subject tracks and keyframe channels.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::crouch::TransitionDurations;

/// Position in source length units.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Stance flags as logged by the replay parser. They are not guaranteed to be
/// mutually exclusive.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StanceFlags {
    /// `is_ducking`
    pub crouching: bool,
    /// `is_ducking_in_progress`
    pub entering_crouch: bool,
    /// `is_unducking_in_progress`
    pub exiting_crouch: bool,
    /// `is_standing`
    pub standing: bool,
}

/// One tick of telemetry for one subject.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SampleRow {
    pub tick: i64,
    pub subject_id: String,
    pub position: Vec3,
    /// Degrees, clockwise in the source convention.
    pub yaw: f64,
    /// Degrees of elevation in the source convention.
    pub pitch: f64,
    pub flags: StanceFlags,
}

/// The six animated channels of a camera.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    LocX,
    LocY,
    LocZ,
    RotX,
    RotY,
    RotZ,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::LocX,
        Channel::LocY,
        Channel::LocZ,
        Channel::RotX,
        Channel::RotY,
        Channel::RotZ,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Channel::LocX => "loc_x",
            Channel::LocY => "loc_y",
            Channel::LocZ => "loc_z",
            Channel::RotX => "rot_x",
            Channel::RotY => "rot_y",
            Channel::RotZ => "rot_z",
        }
    }

    /// Animated property the channel drives on the host object.
    pub fn data_path(self) -> &'static str {
        match self {
            Channel::LocX | Channel::LocY | Channel::LocZ => "location",
            Channel::RotX | Channel::RotY | Channel::RotZ => "rotation_euler",
        }
    }

    /// Component index within `data_path`.
    pub fn index(self) -> usize {
        match self {
            Channel::LocX | Channel::RotX => 0,
            Channel::LocY | Channel::RotY => 1,
            Channel::LocZ | Channel::RotZ => 2,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

/// A single (tick, value) sample on a channel.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    pub tick: i64,
    pub value: f64,
}

/// Keyframes for all six channels of one subject.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ChannelSet {
    channels: [Vec<Keyframe>; 6],
}

impl ChannelSet {
    #[inline]
    pub fn push(&mut self, channel: Channel, tick: i64, value: f64) {
        self.channels[channel.slot()].push(Keyframe { tick, value });
    }

    #[inline]
    pub fn get(&self, channel: Channel) -> &[Keyframe] {
        &self.channels[channel.slot()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &[Keyframe])> {
        Channel::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    pub fn is_empty(&self) -> bool {
        self.channels.iter().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        self.channels.iter_mut().for_each(Vec::clear);
    }

    /// (min, max) tick across all channels, or None when every channel is empty.
    pub fn tick_bounds(&self) -> Option<(i64, i64)> {
        self.channels
            .iter()
            .flatten()
            .fold(None, |acc, k| match acc {
                None => Some((k.tick, k.tick)),
                Some((lo, hi)) => Some((lo.min(k.tick), hi.max(k.tick))),
            })
    }

    /// `offset` must come from a `GlobalTimeline::scan` over these keys.
    pub(crate) fn shift_ticks(&mut self, offset: i64) {
        for key in self.channels.iter_mut().flatten() {
            key.tick += offset;
        }
    }

    /// Stable sort of every channel by tick.
    pub fn sort(&mut self) {
        for ch in self.channels.iter_mut() {
            ch.sort_by_key(|k| k.tick);
        }
    }
}

/// Full per-subject pipeline state.
#[derive(Clone, Debug, PartialEq)]
pub struct SubjectTrack {
    pub subject_id: String,
    /// Rows in temporal order.
    pub rows: Vec<SampleRow>,
    durations: Option<TransitionDurations>,
    pub channels: ChannelSet,
}

impl SubjectTrack {
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            rows: Vec::new(),
            durations: None,
            channels: ChannelSet::default(),
        }
    }

    /// Inferred crouch/uncrouch durations, available once synthesized.
    pub fn durations(&self) -> Option<TransitionDurations> {
        self.durations
    }

    /// Durations are derived once per subject; later calls keep the first value.
    pub(crate) fn durations_or_init(
        &mut self,
        init: impl FnOnce(&[SampleRow]) -> TransitionDurations,
    ) -> TransitionDurations {
        match self.durations {
            Some(d) => d,
            None => {
                let d = init(&self.rows);
                self.durations = Some(d);
                d
            }
        }
    }
}

/// Subject tracks keyed by identity, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackSet {
    tracks: IndexMap<String, SubjectTrack>,
}

impl TrackSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track for `subject_id`, created on first sighting.
    pub fn entry(&mut self, subject_id: &str) -> &mut SubjectTrack {
        if !self.tracks.contains_key(subject_id) {
            self.tracks
                .insert(subject_id.to_owned(), SubjectTrack::new(subject_id));
        }
        &mut self.tracks[subject_id]
    }

    pub fn get(&self, subject_id: &str) -> Option<&SubjectTrack> {
        self.tracks.get(subject_id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &SubjectTrack> {
        self.tracks.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SubjectTrack> {
        self.tracks.values_mut()
    }

    pub fn subject_ids(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.tracks.values().map(|t| t.rows.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_set_preserves_first_seen_order() {
        let mut set = TrackSet::new();
        set.entry("zeta");
        set.entry("alpha");
        set.entry("zeta");
        let ids: Vec<&str> = set.subject_ids().collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
    }

    #[test]
    fn tick_bounds_span_all_channels() {
        let mut ch = ChannelSet::default();
        assert_eq!(ch.tick_bounds(), None);
        ch.push(Channel::LocX, 10, 0.0);
        ch.push(Channel::RotZ, 4, 0.0);
        ch.push(Channel::LocZ, 12, 0.0);
        assert_eq!(ch.tick_bounds(), Some((4, 12)));
    }
}
