//! Crouch/stand transition model.
//!
//! Crouch entry and exit take a fixed number of engine ticks. Those lengths
//! are inferred per subject from the first observed run of each transition
//! flag, then a four-state machine walks the rows and yields a vertical
//! offset that eases the camera down and back up.
//!
//! The machine is a pure function of `(state, flags, durations)`; the offset
//! is a pure function of `(state, durations, depth)`.

use serde::{Deserialize, Serialize};

use crate::data::{SampleRow, StanceFlags};
use crate::interp::eased_progress;

/// Ticks for a full crouch when the log never shows one.
pub const DEFAULT_CROUCH_TICKS: u32 = 13;
/// Ticks for a full stand-up when the log never shows one.
pub const DEFAULT_UNCROUCH_TICKS: u32 = 9;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionDurations {
    pub crouch: u32,
    pub uncrouch: u32,
}

impl Default for TransitionDurations {
    fn default() -> Self {
        Self {
            crouch: DEFAULT_CROUCH_TICKS,
            uncrouch: DEFAULT_UNCROUCH_TICKS,
        }
    }
}

impl TransitionDurations {
    /// Infer both durations from a subject's rows, falling back to the defaults.
    pub fn infer(rows: &[SampleRow]) -> Self {
        Self {
            crouch: detect_duration(
                rows.iter().map(|r| r.flags.entering_crouch),
                DEFAULT_CROUCH_TICKS,
            ),
            uncrouch: detect_duration(
                rows.iter().map(|r| r.flags.exiting_crouch),
                DEFAULT_UNCROUCH_TICKS,
            ),
        }
    }
}

/// Length of the first maximal run of `true`, or `default` if there is none.
/// A run that reaches the end of the sequence still counts.
pub fn detect_duration<I>(flags: I, default: u32) -> u32
where
    I: IntoIterator<Item = bool>,
{
    let mut count = 0u32;
    for flag in flags {
        if flag {
            count += 1;
        } else if count > 0 {
            break;
        }
    }
    if count == 0 {
        default
    } else {
        count
    }
}

/// Crouch state with its progress timer (ticks since entering a transition).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", content = "timer", rename_all = "snake_case")]
pub enum CrouchState {
    #[default]
    Standing,
    Crouching(u32),
    Crouched,
    Uncrouching(u32),
}

impl CrouchState {
    pub fn progress_timer(self) -> u32 {
        match self {
            CrouchState::Crouching(t) | CrouchState::Uncrouching(t) => t,
            CrouchState::Standing | CrouchState::Crouched => 0,
        }
    }
}

/// Advance the machine by one tick.
pub fn transition(
    state: CrouchState,
    flags: &StanceFlags,
    durations: TransitionDurations,
) -> CrouchState {
    let cd = durations.crouch;
    let ud = durations.uncrouch;
    match state {
        CrouchState::Standing => {
            if flags.entering_crouch {
                CrouchState::Crouching(1)
            } else {
                CrouchState::Standing
            }
        }
        CrouchState::Crouching(mut timer) => {
            if flags.entering_crouch && timer < cd {
                timer += 1;
            }
            if timer >= cd {
                CrouchState::Crouched
            } else if !flags.entering_crouch && !flags.crouching {
                // Early release: carry the progress over into the reverse timeline.
                let remaining = 1.0 - timer as f64 / cd as f64;
                CrouchState::Uncrouching((ud as f64 * remaining).round_ties_even() as u32)
            } else {
                CrouchState::Crouching(timer)
            }
        }
        CrouchState::Crouched => {
            if flags.exiting_crouch {
                CrouchState::Uncrouching(1)
            } else {
                CrouchState::Crouched
            }
        }
        CrouchState::Uncrouching(timer) => {
            if timer < ud {
                CrouchState::Uncrouching(timer + 1)
            } else {
                CrouchState::Standing
            }
        }
    }
}

/// Downward camera offset for a state, in the same units as `depth`.
pub fn vertical_offset(state: CrouchState, durations: TransitionDurations, depth: f64) -> f64 {
    match state {
        CrouchState::Standing => 0.0,
        CrouchState::Crouching(timer) => eased_progress(timer, durations.crouch) * depth,
        CrouchState::Crouched => depth,
        CrouchState::Uncrouching(timer) => {
            (1.0 - eased_progress(timer, durations.uncrouch)) * depth
        }
    }
}

/// Stateful wrapper that walks a row sequence.
#[derive(Clone, Debug)]
pub struct CrouchMachine {
    state: CrouchState,
    durations: TransitionDurations,
    depth: f64,
}

impl CrouchMachine {
    pub fn new(durations: TransitionDurations, depth: f64) -> Self {
        Self {
            state: CrouchState::Standing,
            durations,
            depth,
        }
    }

    pub fn state(&self) -> CrouchState {
        self.state
    }

    /// Consume one tick's flags and return the offset for that tick.
    pub fn advance(&mut self, flags: &StanceFlags) -> f64 {
        self.state = transition(self.state, flags, self.durations);
        vertical_offset(self.state, self.durations, self.depth)
    }
}

/// Offsets for every row, in order.
pub fn offsets(rows: &[SampleRow], durations: TransitionDurations, depth: f64) -> Vec<f64> {
    let mut machine = CrouchMachine::new(durations, depth);
    rows.iter().map(|r| machine.advance(&r.flags)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entering() -> StanceFlags {
        StanceFlags {
            entering_crouch: true,
            ..StanceFlags::default()
        }
    }

    #[test]
    fn run_at_end_of_sequence_counts() {
        assert_eq!(detect_duration([false, true, true, true], 13), 3);
    }

    #[test]
    fn only_first_run_is_measured() {
        assert_eq!(detect_duration([true, true, false, true, true, true], 13), 2);
    }

    #[test]
    fn early_release_maps_into_uncrouch_timeline() {
        let d = TransitionDurations {
            crouch: 4,
            uncrouch: 8,
        };
        let s = transition(CrouchState::Standing, &entering(), d);
        assert_eq!(s, CrouchState::Crouching(1));
        let s = transition(s, &StanceFlags::default(), d);
        // 8 * (1 - 1/4) = 6
        assert_eq!(s, CrouchState::Uncrouching(6));
    }

    #[test]
    fn held_crouch_flag_keeps_crouching_state() {
        let d = TransitionDurations {
            crouch: 4,
            uncrouch: 8,
        };
        let held = StanceFlags {
            crouching: true,
            ..StanceFlags::default()
        };
        let s = transition(CrouchState::Crouching(2), &held, d);
        assert_eq!(s, CrouchState::Crouching(2));
    }

    #[test]
    fn release_rounds_half_to_even() {
        let d = TransitionDurations {
            crouch: 4,
            uncrouch: 5,
        };
        // 5 * (1 - 2/4) = 2.5 -> 2
        let s = transition(CrouchState::Crouching(2), &StanceFlags::default(), d);
        assert_eq!(s, CrouchState::Uncrouching(2));
    }

    #[test]
    fn uncrouch_returns_to_standing_after_full_duration() {
        let d = TransitionDurations {
            crouch: 2,
            uncrouch: 2,
        };
        let idle = StanceFlags::default();
        let s = transition(CrouchState::Uncrouching(1), &idle, d);
        assert_eq!(s, CrouchState::Uncrouching(2));
        assert_eq!(vertical_offset(s, d, 10.0), 0.0);
        let s = transition(s, &idle, d);
        assert_eq!(s, CrouchState::Standing);
    }
}
