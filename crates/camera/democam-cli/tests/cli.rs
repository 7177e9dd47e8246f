use std::process::Command;

fn democam() -> Command {
    Command::new(env!("CARGO_BIN_EXE_democam"))
}

#[test]
fn exports_clips_and_prints_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("cams");
    let input = democam_test_fixtures::logs::path("two-subjects").expect("fixture");

    let result = democam()
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&out)
        .args(["--format", "json"])
        .output()
        .expect("run democam");
    assert!(
        result.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let summary: serde_json::Value = serde_json::from_slice(&result.stdout).expect("json summary");
    assert_eq!(summary["rows_read"], 7);
    assert_eq!(summary["subjects"], serde_json::json!(["bob", "alice"]));
    assert_eq!(summary["frame_range"], serde_json::json!([1, 54]));
    assert_eq!(summary["exported"].as_array().map(Vec::len), Some(2));
    assert!(out.join("Cam_bob.json").is_file());
    assert!(out.join("Cam_alice.json").is_file());
}

#[test]
fn config_file_and_flags_combine() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("cams");
    let input = democam_test_fixtures::logs::path("malformed-pitch").expect("fixture");
    let config = democam_test_fixtures::configs::path("export-30fps").expect("config");

    let result = democam()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .arg("-c")
        .arg(&config)
        .args(["--frame-step", "1", "--format", "json"])
        .output()
        .expect("run democam");
    assert!(
        result.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let summary: serde_json::Value = serde_json::from_slice(&result.stdout).expect("json summary");
    // config file switches malformed rows to skip
    assert_eq!(summary["rows_skipped"], 1);

    let clip: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(out.join("Cam_gina.json")).expect("clip"),
    )
    .expect("clip json");
    assert_eq!(clip["fps"], 30);
    assert_eq!(clip["frameStep"], 1.0);
    assert_eq!(clip["axisForward"], "-Z");
    assert_eq!(clip["axisUp"], "Y");
    assert_eq!(clip["scaleMode"], "apply_all");
}

#[test]
fn dry_run_writes_no_clips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("cams");
    let input = democam_test_fixtures::logs::path("crouch-cycle").expect("fixture");

    let result = democam()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .args(["--dry-run", "--format", "json"])
        .output()
        .expect("run democam");
    assert!(result.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&result.stdout).expect("json summary");
    assert!(summary["host_calls"].as_array().is_some_and(|c| !c.is_empty()));
    assert!(!out.join("Cam_carol.json").exists());
    assert!(!out.join("Cam_carol.fbx").exists());
}

#[test]
fn missing_input_fails_with_message() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = democam()
        .arg("-i")
        .arg(dir.path().join("nope.csv"))
        .arg("-o")
        .arg(dir.path().join("cams"))
        .output()
        .expect("run democam");
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("input log not found"), "stderr: {stderr}");
}
