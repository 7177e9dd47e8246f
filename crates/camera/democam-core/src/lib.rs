//! democam-core (host-agnostic)
//!
//! Turns a per-tick player POV log from a game replay into camera animation:
//! rows are grouped per player, a crouch/stand model eases the eye height,
//! view angles become camera rotations, and all players' channels are
//! shifted onto one timeline before each camera is exported through an
//! [`AnimationHost`].

pub mod assembler;
pub mod baking;
pub mod config;
pub mod crouch;
pub mod data;
pub mod error;
pub mod export;
pub mod host;
pub mod ids;
pub mod interp;
pub mod orientation;
pub mod parser;
pub mod pipeline;
pub mod sampling;

// Re-exports for consumers (CLI, hosts)
pub use assembler::{assemble, normalize, synthesize, GlobalTimeline, SynthesisParams};
pub use baking::{bake_channels, BakedClip, BakingConfig};
pub use config::{Config, MalformedRowPolicy};
pub use crouch::{detect_duration, CrouchMachine, CrouchState, TransitionDurations};
pub use data::{Channel, ChannelSet, Keyframe, SampleRow, StanceFlags, SubjectTrack, TrackSet};
pub use error::{DemoCamError, PathRole, Result};
pub use export::{export_all, ExportReport, SubjectExport};
pub use host::{AnimationHost, ExportOptions, HostError, JsonClipHost, RecordingHost};
pub use ids::CameraId;
pub use interp::smoothstep;
pub use orientation::{camera_euler, source_forward, EulerXyz};
pub use parser::{parse_path, parse_reader, ParseOptions, ParsedLog};
pub use pipeline::{prepare, run, PreparedTracks, RunSummary};
pub use sampling::sample_channel;
