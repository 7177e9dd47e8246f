//! Interpolation helpers.
//!
//! Holds the smoothstep easing used by the crouch model and the scalar
//! blend used when sampling keyframe channels.

pub mod functions;

pub use functions::{eased_progress, lerp_f64, progress_ratio, smoothstep};
