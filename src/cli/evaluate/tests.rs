// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

use clap::Parser;
use indoc::formatdoc;
use tempfile::{tempdir, TempDir};

use super::*;
use crate::{comb::Signs, params::EvaluateError, tests::counter_log_text};

const REP: f64 = 250e6;
const OFF: f64 = 20e6;
const BEAT: f64 = 120_340_123.0;
const LASER: f64 = 250_000_140_340_123.0;

/// A temporary directory with a five-record counter log "run.dat".
fn setup(beats: &[f64]) -> (TempDir, PathBuf) {
    let dir = tempdir().expect("couldn't make tmp dir");
    let input = dir.path().join("run.dat");
    write(&input, counter_log_text(REP, OFF, beats)).unwrap();
    (dir, input)
}

fn args(input: &Path, extra: &[&str]) -> EvaluateArgs {
    let input = input.display().to_string();
    let mut args = vec!["evaluate", "-i", &input];
    args.extend_from_slice(extra);
    EvaluateArgs::parse_from(args)
}

#[test]
fn test_dry_run_doesnt_write() {
    let (dir, input) = setup(&[BEAT; 5]);
    let target = LASER.to_string();
    let result = args(&input, &["--target", &target]).run(true);
    assert!(result.is_ok(), "{:?}", result.unwrap_err());
    assert!(!dir.path().join("run.prn").exists());
    assert!(!dir.path().join("run.txt").exists());
}

#[test]
fn test_run_writes_default_outputs() {
    let (dir, input) = setup(&[BEAT; 5]);
    let target = LASER.to_string();
    let result = args(&input, &["--target", &target]).run(false);
    assert!(result.is_ok(), "{:?}", result.unwrap_err());

    let main = read_to_string(dir.path().join("run.prn")).unwrap();
    assert!(main.contains("Mode number: 1000000\n"));
    assert!(main.contains("Beat sign: +\n"));
    assert!(main.contains("Offset sign: +\n"));
    let data: Vec<&str> = main
        .split_once("@@@@\n")
        .expect("header is written")
        .1
        .lines()
        .collect();
    assert_eq!(data.len(), 5);

    let aux = read_to_string(dir.path().join("run.txt")).unwrap();
    assert_eq!(aux.lines().count(), 5);
}

#[test]
fn test_failed_aux_write_leaves_no_main_output() {
    let (dir, input) = setup(&[BEAT; 5]);
    let target = LASER.to_string();
    let mut params = args(&input, &["--target", &target]).parse().unwrap();
    // The aux file can't be created; the directory doesn't exist.
    params.outputs.aux = Some(dir.path().join("missing").join("run.txt"));

    let result = params.run();
    assert!(matches!(result, Err(EvaluateError::FileWrite(_))));
    assert!(!dir.path().join("run.prn").exists());
}

#[test]
fn test_parse() {
    let (_dir, input) = setup(&[BEAT; 5]);
    let target = LASER.to_string();
    let params = args(
        &input,
        &[
            "--target",
            &target,
            "--variant",
            "1",
            "--comb-type",
            "bevfibershg",
            "--offset-freq",
            "10000000",
            "--frep-tolerance",
            "0",
            "--fixed-rep-rate",
            "--mjd",
            "--no-aux",
            "--aux-calibration",
            "-1",
            "2",
        ],
    )
    .parse()
    .unwrap();

    assert_eq!(params.comb.fundamental_offset, 10e6);
    assert_eq!(params.comb.offset_multiplier, 2.0);
    assert_eq!(params.criteria.target_offset, 10e6);
    assert!(params.criteria.rep_tolerance.is_none());
    assert_eq!(params.criteria.offset_tolerance, Some(DEFAULT_FOFF_TOLERANCE));
    assert_eq!(params.criteria.target_beat, Some(BEAT));
    assert_eq!(params.spec, ResolutionSpec::TargetOnly { target: LASER });
    assert_eq!(params.epsilon, DEFAULT_RESOLUTION_EPSILON);
    assert_eq!(params.synthesis.rep_source, RepRateSource::Fixed);
    assert_eq!(params.synthesis.time_axis, TimeAxis::Mjd);
    assert_eq!(params.synthesis.aux_calibration, [-1.0, 2.0]);
    assert!(params.outputs.aux.is_none());
    assert!(params.outputs.write_header);
}

#[test]
fn test_frep_set_point() {
    let (_dir, input) = setup(&[BEAT; 3]);
    let target = LASER.to_string();

    // By default, filter on the mean, but there's no set point.
    let params = args(&input, &["--target", &target]).parse().unwrap();
    assert_eq!(params.criteria.target_rep, Some(REP));
    assert!(params.rep_setpoint.is_none());

    let params = args(&input, &["--target", &target, "--frep", "250000001"])
        .parse()
        .unwrap();
    assert_eq!(params.criteria.target_rep, Some(250000001.0));
    assert_eq!(params.rep_setpoint, Some(250000001.0));
    assert_eq!(params.synthesis.rep_setpoint, Some(250000001.0));

    // 0 switches the set point off.
    let params = args(&input, &["--target", &target, "--frep", "0"])
        .parse()
        .unwrap();
    assert!(params.criteria.target_rep.is_none());
    assert!(params.rep_setpoint.is_none());
}

#[test]
fn test_no_filter() {
    let (_dir, input) = setup(&[BEAT; 3]);
    let target = LASER.to_string();
    let params = args(&input, &["--target", &target, "--no-filter"])
        .parse()
        .unwrap();
    assert!(params.no_filter);
    assert!(!params.criteria.rep_active());
    assert!(!params.criteria.offset_active());
    assert!(!params.criteria.cycle_slip_active());
}

#[test]
fn test_fixed_mode_and_signs() {
    let (_dir, input) = setup(&[BEAT; 3]);
    let params = args(
        &input,
        &["--mode", "1000000", "--beat-sign", "-", "--offset-sign", "+"],
    )
    .parse()
    .unwrap();
    assert_eq!(
        params.spec,
        ResolutionSpec::Fixed {
            mode: 1_000_000,
            signs: Signs {
                beat: Sign::Negative,
                offset: Sign::Positive
            }
        }
    );
}

#[test]
fn test_mode_alone_is_underdetermined() {
    let (_dir, input) = setup(&[BEAT; 3]);
    let result = args(&input, &["--mode", "1000000"]).parse();
    assert!(matches!(result, Err(CombCalError::Resolve(_))));
}

#[test]
fn test_bad_sign() {
    let (_dir, input) = setup(&[BEAT; 3]);
    let target = LASER.to_string();
    let result = args(&input, &["--target", &target, "--beat-sign", "sideways"]).parse();
    match result {
        Err(CombCalError::Evaluate(msg)) => assert!(msg.contains("'sideways' is not a sign"), "{msg}"),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("a bad sign was accepted"),
    }
}

#[test]
fn test_no_input() {
    let result = EvaluateArgs::parse_from(["evaluate", "--target", "1"]).parse();
    assert!(matches!(result, Err(CombCalError::Evaluate(_))));
}

#[test]
fn test_missing_input() {
    let dir = tempdir().expect("couldn't make tmp dir");
    let result = args(&dir.path().join("nothing.dat"), &["--target", "1"]).parse();
    assert!(matches!(result, Err(CombCalError::SeriesRead(_))));
}

#[test]
fn test_input_extension_is_optional() {
    let (dir, _input) = setup(&[BEAT; 3]);
    let target = LASER.to_string();
    let params = args(&dir.path().join("run"), &["--target", &target])
        .parse()
        .unwrap();
    assert_eq!(params.input, dir.path().join("run.dat"));
    assert_eq!(params.outputs.main, dir.path().join("run.prn"));
}

#[test]
fn test_outputs_never_clobber_the_input() {
    let dir = tempdir().expect("couldn't make tmp dir");
    let input = dir.path().join("run.txt");
    write(&input, counter_log_text(REP, OFF, &[BEAT; 3])).unwrap();
    let target = LASER.to_string();

    let params = args(&input, &["--target", &target]).parse().unwrap();
    assert_eq!(params.outputs.main, dir.path().join("run.prn"));
    assert_eq!(params.outputs.aux, Some(dir.path().join("run_aux.txt")));

    let input_str = input.display().to_string();
    let result = args(&input, &["--target", &target, "-o", &input_str]).parse();
    assert!(matches!(result, Err(CombCalError::FileWrite(_))));
}

#[test]
fn test_derived_output() {
    assert_eq!(
        derived_output(Path::new("/data/run1.dat"), "prn", "result"),
        PathBuf::from("/data/run1.prn")
    );
    assert_eq!(
        derived_output(Path::new("/data/run1.prn"), "prn", "result"),
        PathBuf::from("/data/run1_result.prn")
    );
}

#[test]
fn test_tolerances() {
    assert_eq!(tolerance(None, 2.0), Some(2.0));
    assert_eq!(tolerance(Some(3.0), 2.0), Some(3.0));
    assert_eq!(tolerance(Some(0.0), 2.0), None);
    assert_eq!(tolerance(Some(-1.0), 2.0), None);
}

#[test]
fn test_empty_series_fails_without_output() {
    let (dir, input) = setup(&[BEAT; 5]);
    let target = LASER.to_string();
    let result = args(
        &input,
        &[
            "--target",
            &target,
            "--frep",
            "250000010",
            "--frep-tolerance",
            "1",
        ],
    )
    .run(false);
    match result {
        Err(CombCalError::Synthesis(msg)) => assert!(msg.contains("5 rejected by f_rep")),
        other => panic!("unexpected result {other:?}"),
    }
    assert!(!dir.path().join("run.prn").exists());
}

#[test]
fn test_ambiguous_signs_fail_without_output() {
    // With a beat equal to the offset, flipping both signs gives the same
    // laser frequency.
    let dir = tempdir().expect("couldn't make tmp dir");
    let input = dir.path().join("run.dat");
    write(&input, counter_log_text(REP, OFF, &[OFF; 3])).unwrap();
    let target = (1e6 * REP).to_string();
    let result = args(&input, &["--target", &target, "--mode", "1000000"]).run(false);
    assert!(matches!(result, Err(CombCalError::Resolve(_))));
    assert!(!dir.path().join("run.prn").exists());
}

#[test]
fn test_merge_prefers_cli_args() {
    let (dir, input) = setup(&[BEAT; 3]);
    let arg_file = dir.path().join("args.toml");
    write(
        &arg_file,
        formatdoc! {r#"
            input = "{}"
            target = {LASER:.1}
            comment = "from the file"
            no_header = true
        "#, input.display()},
    )
    .unwrap();

    let arg_file_str = arg_file.display().to_string();
    let args = EvaluateArgs::parse_from(["evaluate", &arg_file_str, "--comment", "from the CLI"])
        .merge()
        .unwrap();
    assert!(args.args_file.is_none());
    assert_eq!(args.input, Some(input));
    assert_eq!(args.target, Some(LASER));
    assert_eq!(args.comment.as_deref(), Some("from the CLI"));
    assert!(args.no_header);
}

#[test]
fn test_reference_table_from_json_arg_file() {
    let (dir, input) = setup(&[BEAT; 3]);
    let arg_file = dir.path().join("args.json");
    write(
        &arg_file,
        formatdoc! {r#"
            {{
                "input": "{}",
                "reference_table": true,
                "reference_components": [
                    {{ "label": "x", "frequency": {:.1} }},
                    {{ "label": "y", "frequency": {LASER:.1} }}
                ]
            }}
        "#, input.display(), LASER + 60e6},
    )
    .unwrap();

    let arg_file_str = arg_file.display().to_string();
    let args = EvaluateArgs::parse_from(["evaluate", &arg_file_str])
        .merge()
        .unwrap();
    let result = args.run(false);
    assert!(result.is_ok(), "{:?}", result.unwrap_err());
    let main = read_to_string(dir.path().join("run.prn")).unwrap();
    assert!(main.contains("Reference component: y"));
    assert!(main.contains("Mode number: 1000000\n"));
}

#[test]
fn test_unknown_arg_file_type() {
    let (dir, _input) = setup(&[BEAT; 3]);
    let arg_file = dir.path().join("args.yaml");
    write(&arg_file, "target: 1").unwrap();
    let arg_file_str = arg_file.display().to_string();
    let result = EvaluateArgs::parse_from(["evaluate", &arg_file_str]).merge();
    assert!(matches!(result, Err(CombCalError::ArgFile(_))));
}

#[cfg(not(feature = "plotting"))]
#[test]
fn test_plot_needs_the_feature() {
    let (dir, input) = setup(&[BEAT; 3]);
    let target = LASER.to_string();
    let plot = dir.path().join("aux.png").display().to_string();
    let result = args(&input, &["--target", &target, "--plot", &plot]).parse();
    assert!(matches!(result, Err(CombCalError::FileWrite(_))));
}
