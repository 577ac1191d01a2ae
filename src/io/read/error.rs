// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from reading counter logs.

use std::path::PathBuf;

use thiserror::Error;

use crate::constants::NUM_COUNTERS;

#[derive(Error, Debug)]
pub enum SeriesReadError {
    #[error("Couldn't read counter log '{file}': {err}")]
    IO {
        file: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("Counter log '{file}' is malformed: {err}")]
    Format {
        file: PathBuf,
        #[source]
        err: SeriesFormatError,
    },
}

/// Problems with the contents of a counter log, independent of where it came
/// from.
#[derive(Error, Debug)]
pub enum SeriesFormatError {
    #[error("there are no data records")]
    NoRecords,

    #[error("no header line specifies the start time (expected e.g. '# start: 1700000000.0')")]
    NoStartTime,

    #[error("line {line_num}: couldn't parse the start time '{string}' as Unix seconds")]
    BadStartTime { line_num: u32, string: String },

    #[error("line {line_num}: the start time is specified a second time")]
    DuplicateStartTime { line_num: u32 },

    #[error("line {line_num}: expected {} numbers (elapsed time and {NUM_COUNTERS} counters), got {got}", NUM_COUNTERS + 1)]
    WrongFieldCount { line_num: u32, got: usize },

    #[error("line {line_num}: couldn't parse '{string}' as a number")]
    ParseFloat { line_num: u32, string: String },

    #[error("line {line_num}: '{string}' is not a finite number")]
    NonFinite { line_num: u32, string: String },

    #[error("line {line_num}: elapsed time {elapsed} s is earlier than the previous record's ({previous} s)")]
    TimeGoesBackwards {
        line_num: u32,
        elapsed: f64,
        previous: f64,
    },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
