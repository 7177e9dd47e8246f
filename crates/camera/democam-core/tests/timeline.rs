use democam_core::{
    assemble, normalize, parse_reader, Channel, Config, DemoCamError, GlobalTimeline,
    ParseOptions, SynthesisParams, TrackSet,
};

fn two_subjects() -> TrackSet {
    let csv = democam_test_fixtures::logs::csv("two-subjects").expect("fixture");
    parse_reader(csv.as_bytes(), ParseOptions::default())
        .expect("parse")
        .tracks
}

fn params() -> SynthesisParams {
    SynthesisParams::from(&Config::default())
}

#[test]
fn normalization_starts_every_run_at_tick_one() {
    let mut tracks = two_subjects();
    let timeline = assemble(&mut tracks, params()).expect("ticks fit").expect("timeline");

    assert_eq!(
        timeline,
        GlobalTimeline {
            min_tick: 50,
            max_tick: 103,
            tick_offset: -49,
        }
    );
    assert_eq!(timeline.duration(), 54);
    assert_eq!(timeline.duration(), timeline.max_tick - timeline.min_tick + 1);
    assert_eq!(timeline.frame_range(), (1, 54));

    let global_min = tracks
        .iter()
        .filter_map(|t| t.channels.tick_bounds())
        .map(|(lo, _)| lo)
        .min();
    assert_eq!(global_min, Some(1));

    let bob = tracks.get("bob").expect("bob");
    let ticks: Vec<i64> = bob.channels.get(Channel::LocX).iter().map(|k| k.tick).collect();
    assert_eq!(ticks, vec![1, 2, 3]);
    let alice = tracks.get("alice").expect("alice");
    let ticks: Vec<i64> = alice.channels.get(Channel::RotZ).iter().map(|k| k.tick).collect();
    assert_eq!(ticks, vec![51, 52, 53, 54]);
}

#[test]
fn normalization_is_idempotent() {
    let mut tracks = two_subjects();
    assemble(&mut tracks, params()).expect("ticks fit").expect("timeline");
    let before = tracks.clone();

    let again = normalize(&mut tracks).expect("ticks fit").expect("timeline");
    assert_eq!(again.tick_offset, 0);
    assert_eq!(again.min_tick, 1);
    assert_eq!(tracks, before);
}

#[test]
fn every_channel_gets_one_key_per_row() {
    let mut tracks = two_subjects();
    assemble(&mut tracks, params()).expect("ticks fit").expect("timeline");
    for track in tracks.iter() {
        for (channel, keys) in track.channels.iter() {
            assert_eq!(
                keys.len(),
                track.rows.len(),
                "{} {}",
                track.subject_id,
                channel.name()
            );
        }
    }
}

#[test]
fn empty_input_has_no_timeline() {
    let mut tracks = TrackSet::new();
    assert!(matches!(assemble(&mut tracks, params()), Ok(None)));
}

#[test]
fn crouch_dip_only_affects_the_crouching_subject() {
    let cfg = Config::default();
    let head = cfg.head_offset_units();
    let mut tracks = two_subjects();
    assemble(&mut tracks, SynthesisParams::from(&cfg))
        .expect("ticks fit")
        .expect("timeline");

    let bob = tracks.get("bob").expect("bob");
    for (row, key) in bob.rows.iter().zip(bob.channels.get(Channel::LocZ)) {
        assert!((key.value - (row.position.z + head)).abs() < 1e-9);
    }

    let alice = tracks.get("alice").expect("alice");
    let dips: Vec<f64> = alice
        .rows
        .iter()
        .zip(alice.channels.get(Channel::LocZ))
        .map(|(row, key)| row.position.z + head - key.value)
        .collect();
    assert_eq!(dips[0], 0.0);
    assert!(dips[1..].iter().all(|d| *d > 0.0), "dips: {dips:?}");
    assert!(dips[1] < dips[2], "dip should deepen: {dips:?}");
    assert!(dips.iter().all(|d| *d <= cfg.crouch_depth_units() + 1e-9));
}

fn single_row_log(ticks: &[i64]) -> TrackSet {
    let mut csv = String::from(
        "tick,player_name,pos_x,pos_y,pos_z,view_dir_x,view_dir_y,is_ducking,is_ducking_in_progress,is_unducking_in_progress,is_standing\n",
    );
    for tick in ticks {
        csv.push_str(&format!("{tick},ivo,0,0,0,0,0,0,0,0,1\n"));
    }
    parse_reader(csv.as_bytes(), ParseOptions::default())
        .expect("parse")
        .tracks
}

#[test]
fn extreme_ticks_are_rejected_instead_of_overflowing() {
    let mut tracks = single_row_log(&[i64::MIN]);
    let err = assemble(&mut tracks, params()).expect_err("offset overflows");
    assert!(matches!(
        err,
        DemoCamError::TickOverflow {
            min_tick: i64::MIN,
            max_tick: i64::MIN,
        }
    ));

    let mut tracks = single_row_log(&[-10, i64::MAX]);
    assert!(matches!(
        assemble(&mut tracks, params()),
        Err(DemoCamError::TickOverflow { .. })
    ));
}

#[test]
fn largest_representable_span_still_normalizes() {
    let mut tracks = single_row_log(&[1, i64::MAX]);
    let timeline = assemble(&mut tracks, params())
        .expect("ticks fit")
        .expect("timeline");
    assert_eq!(timeline.tick_offset, 0);
    assert_eq!(timeline.frame_range(), (1, i64::MAX));
}
