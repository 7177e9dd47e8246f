//! Channel sampling at fractional frames.
//!
//! Model:
//! - Keys are sorted by tick (the assembler emits them that way; hosts sort
//!   before finalizing).
//! - Before the first key / after the last key the end value is held.
//! - Between neighbours the value is blended linearly.
//! - When several keys share a tick, the last one wins.

use crate::data::Keyframe;
use crate::interp::lerp_f64;

/// Sample `keys` at `frame`. None when there are no keys.
pub fn sample_channel(keys: &[Keyframe], frame: f64) -> Option<f64> {
    let first = keys.first()?;
    // keys at or before `frame`; the last of them is the left neighbour
    let hi = keys.partition_point(|k| (k.tick as f64) <= frame);
    if hi == 0 {
        let first_tick_end = keys.partition_point(|k| k.tick <= first.tick);
        return Some(keys[first_tick_end - 1].value);
    }
    let left = keys[hi - 1];
    let Some(&right) = keys.get(hi) else {
        return Some(left.value);
    };
    let t = (frame - left.tick as f64) / (right.tick as f64 - left.tick as f64);
    Some(lerp_f64(left.value, right.value, t))
}
