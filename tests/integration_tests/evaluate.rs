// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::read_to_string;

use approx::assert_abs_diff_eq;
use indoc::formatdoc;
use tempfile::TempDir;

use crate::{comb_cal, get_cmd_output, write_session_log, BEAT, LASER, OFF, REP};

/// The data lines of a main output file.
fn data_lines(contents: &str) -> Vec<Vec<f64>> {
    let data = match contents.split_once("@@@@\n") {
        Some((_, data)) => data,
        None => contents,
    };
    data.lines()
        .map(|l| l.split_whitespace().map(|f| f.parse().unwrap()).collect())
        .collect()
}

#[test]
fn test_evaluate_session() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let input = write_session_log(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = comb_cal()
        .args([
            "evaluate",
            "-i", &format!("{}", input.display()),
            "--target", LASER,
            "--frep", "250000000",
            "--comment", "integration",
        ])
        .ok();
    assert!(cmd.is_ok(), "evaluate failed: {}", cmd.err().unwrap());

    let main = read_to_string(tmp_dir.path().join("session.prn")).unwrap();
    assert!(main.contains("> Laser: ECDL 633 nm\n"));
    assert!(main.contains("Comment: integration\n"));
    assert!(main.contains("Mode number: 1000000\n"));
    assert!(main.contains("Raw samples: 10\n"));
    assert!(main.contains("Valid samples: 7\n"));
    assert!(main.contains("Outliers: 3 (30.00%; f_rep 2, f_off 0, cycle slips 1)"));

    let data = data_lines(&main);
    let elapsed: Vec<f64> = data.iter().map(|d| d[0]).collect();
    assert_eq!(elapsed, [0.0, 1.0, 2.0, 4.0, 6.0, 8.0, 9.0]);
    for d in &data {
        assert_eq!(d.len(), 5);
        assert_abs_diff_eq!(d[1], REP);
        assert_abs_diff_eq!(d[2], OFF);
        // f_laser = N f_rep + f_beat + f_off, and f_beat = BEAT + elapsed.
        assert_abs_diff_eq!(d[4], 1e6 * REP + OFF + BEAT + d[0], epsilon = 0.1);
    }

    let aux = read_to_string(tmp_dir.path().join("session.txt")).unwrap();
    assert_eq!(aux.lines().count(), 7);
}

#[test]
fn test_evaluate_mjd_and_delta() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let input = write_session_log(tmp_dir.path());
    let aux = tmp_dir.path().join("delta.txt");

    #[rustfmt::skip]
    let cmd = comb_cal()
        .args([
            "evaluate",
            "-i", &format!("{}", input.display()),
            "--target", LASER,
            "--frep", "250000000",
            "--aux", &format!("{}", aux.display()),
            "--aux-quantity", "delta_laser_frequency",
            "--mjd",
            "--no-header",
        ])
        .ok();
    assert!(cmd.is_ok(), "evaluate failed: {}", cmd.err().unwrap());

    let main = read_to_string(tmp_dir.path().join("session.prn")).unwrap();
    assert!(!main.contains("@@@@"));
    assert_eq!(data_lines(&main).len(), 7);

    let aux = data_lines(&read_to_string(aux).unwrap());
    assert_eq!(aux.len(), 7);
    assert_abs_diff_eq!(aux[0][0], 1_700_000_000.0 / 86400.0 + 40587.0, epsilon = 1e-7);
    // The target is exactly the laser frequency of the first record.
    assert_abs_diff_eq!(aux[0][1], 0.0, epsilon = 0.1);
    assert_abs_diff_eq!(aux[6][1], 9.0, epsilon = 0.1);
}

#[test]
fn test_evaluate_from_arg_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let input = write_session_log(tmp_dir.path());
    let args = tmp_dir.path().join("args.toml");
    std::fs::write(
        &args,
        formatdoc! {r#"
            input = "{}"
            mode = 1000000
            beat_sign = "+"
            offset_sign = "+"
            frep = 250000000.0
            no_aux = true
        "#, input.display()},
    )
    .unwrap();

    let cmd = comb_cal()
        .args(["evaluate", &format!("{}", args.display())])
        .ok();
    assert!(cmd.is_ok(), "evaluate failed: {}", cmd.err().unwrap());
    let main = read_to_string(tmp_dir.path().join("session.prn")).unwrap();
    assert!(main.contains("Resolution: mode number and signs given\n"));
    assert!(!tmp_dir.path().join("session.txt").exists());
}

#[test]
fn test_save_toml() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let input = write_session_log(tmp_dir.path());
    let saved = tmp_dir.path().join("saved.toml");

    #[rustfmt::skip]
    let cmd = comb_cal()
        .args([
            "evaluate",
            "-i", &format!("{}", input.display()),
            "--target", LASER,
            "--dry-run",
            "--save-toml", &format!("{}", saved.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "evaluate failed: {}", cmd.err().unwrap());
    assert!(!tmp_dir.path().join("session.prn").exists());

    let saved = read_to_string(saved).unwrap();
    assert!(saved.contains("target = 250000140340123.0"));
}

#[test]
fn test_underdetermined_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let input = write_session_log(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = comb_cal()
        .args([
            "evaluate",
            "-i", &format!("{}", input.display()),
            "--mode", "1000000",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("a mode number alone"), "{stderr}");
    assert!(!tmp_dir.path().join("session.prn").exists());
}

#[test]
fn test_all_outliers_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let input = write_session_log(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = comb_cal()
        .args([
            "evaluate",
            "-i", &format!("{}", input.display()),
            "--target", LASER,
            "--frep", "250000100",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("10 rejected by f_rep"), "{stderr}");
    assert!(!tmp_dir.path().join("session.prn").exists());
}

#[test]
fn test_unknown_comb_type_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let input = write_session_log(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = comb_cal()
        .args([
            "evaluate",
            "-i", &format!("{}", input.display()),
            "--target", LASER,
            "--comb-type", "42",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Comb type '42' is unknown"), "{stderr}");
}
