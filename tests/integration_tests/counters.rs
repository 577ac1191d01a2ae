// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{comb_cal, get_cmd_output, write_session_log};

#[test]
fn test_counters_summary() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let input = write_session_log(tmp_dir.path());

    let cmd = comb_cal()
        .args(["counters", &format!("{}", input.display())])
        .ok();
    assert!(cmd.is_ok(), "counters failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("10 records"), "{stdout}");
    assert!(stdout.contains("> Laser: ECDL 633 nm"), "{stdout}");
    assert!(stdout.contains("(f_beat)"), "{stdout}");
    assert!(stdout.contains("Predicted f_rep: 250000001.000000 Hz"), "{stdout}");
}

#[test]
fn test_counters_bad_variant() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let input = write_session_log(tmp_dir.path());

    let cmd = comb_cal()
        .args([
            "counters",
            &format!("{}", input.display()),
            "--variant",
            "3",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Hardware variant '3' is unknown"), "{stderr}");
}
