#![cfg(all(feature="opencv", feature="apriltag"))]

use assert_cmd::Command;
use predicates::prelude::*;

fn demo() -> Command {
	let mut cmd = Command::cargo_bin("opencv_demo").unwrap();
	cmd.env_remove("RUST_LOG");
	cmd
}

#[test]
fn help_exits_cleanly() {
	demo()
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("--family"))
		.stdout(predicate::str::contains("--refine-edges"));
}

#[test]
fn bogus_family_is_rejected() {
	let assert = demo()
		.args(["--family", "bogusfamily"])
		.assert()
		.failure()
		.stdout(predicate::str::contains("Unrecognized tag family name"))
		.stdout(predicate::str::contains("tag36h11"))
		.stdout(predicate::str::contains("Time spent").not());
	// exit(-1)
	if cfg!(unix) {
		assert.code(255);
	}
}

#[test]
fn bad_number_is_rejected() {
	demo()
		.args(["--decimate", "0.5"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("Invalid configuration"))
		.stdout(predicate::str::contains("Time spent").not());
}

#[test]
fn syntax_error_uses_clap_status() {
	demo()
		.args(["--threads", "many"])
		.assert()
		.code(2);
}

#[test]
fn detector_is_built_before_camera() {
	// No camera 99, but the thread count fails first
	demo()
		.args(["--threads", "300", "--camera", "99"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("threads are supported"))
		.stderr(predicate::str::contains("video capture").not());
}
