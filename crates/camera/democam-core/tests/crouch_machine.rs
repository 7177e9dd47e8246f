use approx::assert_relative_eq;
use democam_core::{
    crouch::{offsets, transition, vertical_offset, DEFAULT_CROUCH_TICKS, DEFAULT_UNCROUCH_TICKS},
    detect_duration, parse_reader, smoothstep, CrouchState, ParseOptions, StanceFlags,
    TransitionDurations,
};

fn ints_to_flags(xs: &[u8]) -> Vec<bool> {
    xs.iter().map(|&x| x != 0).collect()
}

#[test]
fn detect_duration_measures_first_run() {
    let col = ints_to_flags(&[0, 0, 1, 1, 1, 1, 1, 0, 0]);
    assert_eq!(detect_duration(col, DEFAULT_CROUCH_TICKS), 5);
}

#[test]
fn detect_duration_falls_back_to_default() {
    let col = ints_to_flags(&[0; 9]);
    assert_eq!(detect_duration(col.clone(), DEFAULT_CROUCH_TICKS), 13);
    assert_eq!(detect_duration(col, DEFAULT_UNCROUCH_TICKS), 9);
}

#[test]
fn inferred_durations_come_from_each_flag() {
    let csv = democam_test_fixtures::logs::csv("crouch-cycle").expect("fixture");
    let parsed = parse_reader(csv.as_bytes(), ParseOptions::default()).expect("parse");
    let carol = parsed.tracks.get("carol").expect("carol");
    let d = TransitionDurations::infer(&carol.rows);
    assert_eq!(
        d,
        TransitionDurations {
            crouch: 4,
            uncrouch: 3
        }
    );
}

#[test]
fn full_crouch_cycle_offsets() {
    let csv = democam_test_fixtures::logs::csv("crouch-cycle").expect("fixture");
    let parsed = parse_reader(csv.as_bytes(), ParseOptions::default()).expect("parse");
    let rows = &parsed.tracks.get("carol").expect("carol").rows;
    let d = TransitionDurations::infer(rows);
    let depth = 27.0;
    let got = offsets(rows, d, depth);

    let expected = [
        0.0,
        0.0,
        smoothstep(0.25) * depth,
        smoothstep(0.5) * depth,
        smoothstep(0.75) * depth,
        depth,
        depth,
        depth,
        depth,
        20.0, // (1 - smoothstep(1/3)) * 27
        7.0,  // (1 - smoothstep(2/3)) * 27
        0.0,
        0.0,
        0.0,
        0.0,
    ];
    assert_eq!(got.len(), expected.len());
    for (i, (g, e)) in got.iter().zip(expected.iter()).enumerate() {
        assert!((g - e).abs() < 1e-9, "tick #{i}: got {g}, expected {e}");
    }
}

#[test]
fn state_sequence_matches_transition_table() {
    let d = TransitionDurations {
        crouch: 2,
        uncrouch: 2,
    };
    let press = StanceFlags {
        entering_crouch: true,
        ..StanceFlags::default()
    };
    let held = StanceFlags {
        crouching: true,
        ..StanceFlags::default()
    };
    let release = StanceFlags {
        exiting_crouch: true,
        ..StanceFlags::default()
    };

    let mut s = CrouchState::Standing;
    let mut seen = Vec::new();
    for f in [press, press, held, release, release, held, held] {
        s = transition(s, &f, d);
        seen.push(s);
    }
    assert_eq!(
        seen,
        vec![
            CrouchState::Crouching(1),
            CrouchState::Crouched,
            CrouchState::Crouched,
            CrouchState::Uncrouching(1),
            CrouchState::Uncrouching(2),
            CrouchState::Standing,
            CrouchState::Standing,
        ]
    );
}

#[test]
fn offsets_are_deterministic() {
    let csv = democam_test_fixtures::logs::csv("crouch-cycle").expect("fixture");
    let parsed = parse_reader(csv.as_bytes(), ParseOptions::default()).expect("parse");
    let rows = &parsed.tracks.get("carol").expect("carol").rows;
    let d = TransitionDurations::default();
    let a = offsets(rows, d, 10.0);
    let b = offsets(rows, d, 10.0);
    assert_eq!(a, b);
}

#[test]
fn offsets_stay_within_crouch_depth() {
    let csv = democam_test_fixtures::logs::csv("crouch-cycle").expect("fixture");
    let parsed = parse_reader(csv.as_bytes(), ParseOptions::default()).expect("parse");
    let rows = &parsed.tracks.get("carol").expect("carol").rows;
    for d in [
        TransitionDurations::default(),
        TransitionDurations {
            crouch: 1,
            uncrouch: 1,
        },
    ] {
        for off in offsets(rows, d, 21.7) {
            assert!((0.0..=21.7).contains(&off), "offset {off} out of range");
        }
    }
}

#[test]
fn zero_durations_do_not_divide() {
    let d = TransitionDurations {
        crouch: 0,
        uncrouch: 0,
    };
    assert_relative_eq!(vertical_offset(CrouchState::Crouching(3), d, 5.0), 0.0);
    assert_relative_eq!(vertical_offset(CrouchState::Uncrouching(3), d, 5.0), 5.0);
}
