// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod counters;
mod evaluate;
mod no_stderr;

use std::{
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use indoc::indoc;

const REP: f64 = 250e6;
const OFF: f64 = 20e6;
const BEAT: f64 = 120_340_123.0;

/// f_laser for mode number 1,000,000 with both signs positive.
const LASER: &str = "250000140340123";

fn comb_cal() -> Command {
    Command::cargo_bin("comb-cal").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// Write a ten-record counter log "session.dat" into `dir`. Records 3 and 7
/// have an f_rep outlier (5 Hz off), record 5 has a cycle slip (1 MHz off).
fn write_session_log(dir: &Path) -> PathBuf {
    let mut text = indoc! {"
        # Comb counter log
        # Laser: ECDL 633 nm
        # start: 1700000000.0
    "}
    .to_string();
    for i in 0..10 {
        let rep = if i == 3 || i == 7 { REP + 5.0 } else { REP };
        let beat = if i == 5 { BEAT + 1e6 } else { BEAT + i as f64 };
        text.push_str(&format!(
            "{:.1} {rep:.3} {OFF:.3} {beat:.3} 1.0 0 0 0\n",
            i as f64
        ));
    }
    let file = dir.join("session.dat");
    std::fs::write(&file, text).unwrap();
    file
}
