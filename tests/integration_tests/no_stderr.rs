// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{comb_cal, get_cmd_output, write_session_log, LASER};

#[test]
fn test_evaluate_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let input = write_session_log(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = comb_cal()
        .args([
            "evaluate",
            "-i", &format!("{}", input.display()),
            "--target", LASER,
            // Produces warnings, which must not go to stderr either.
            "--beat-sign", "+",
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "evaluate failed on simple test data: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_counters_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let input = write_session_log(tmp_dir.path());

    let cmd = comb_cal()
        .args(["counters", &format!("{}", input.display())])
        .ok();
    assert!(cmd.is_ok(), "counters failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
