// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading counter logs.
//!
//! A counter log is plain text. Lines starting with '#' or '%' are header
//! lines; one of them must specify the series start as Unix seconds, e.g.
//!
//! ```text
//! # start: 1700000000.25
//! ```
//!
//! Every other non-blank line is a record: the elapsed time since the start
//! [s] followed by the readings of the seven counters [Hz], separated by
//! whitespace.

mod error;

pub use error::{SeriesFormatError, SeriesReadError};

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use hifitime::Epoch;
use log::{debug, trace};
use vec1::Vec1;

use crate::{
    constants::NUM_COUNTERS,
    series::{CounterSeries, RawSample},
};

const HEADER_MARKERS: [char; 2] = ['#', '%'];
const START_KEY: &str = "start";

/// Read a counter log from a file.
pub fn load<P: AsRef<Path>>(file: P) -> Result<CounterSeries, SeriesReadError> {
    let file = file.as_ref();
    debug!("Reading counter log {}", file.display());
    let fh = File::open(file).map_err(|err| SeriesReadError::IO {
        file: file.to_path_buf(),
        err,
    })?;
    let mut buf = BufReader::new(fh);
    let series = parse_counter_log(&mut buf).map_err(|err| match err {
        SeriesFormatError::IO(err) => SeriesReadError::IO {
            file: file.to_path_buf(),
            err,
        },
        err => SeriesReadError::Format {
            file: file.to_path_buf(),
            err,
        },
    })?;
    debug!(
        "Read {} records and {} header lines",
        series.len(),
        series.header().len()
    );
    Ok(series)
}

/// Parse a buffer containing a counter log into a [`CounterSeries`].
pub fn parse_counter_log<T: BufRead>(buf: &mut T) -> Result<CounterSeries, SeriesFormatError> {
    let mut line = String::new();
    let mut line_num: u32 = 0;
    let mut header = vec![];
    let mut start: Option<Epoch> = None;
    let mut samples: Vec<RawSample> = vec![];

    let parse_float = |string: &str, line_num: u32| -> Result<f64, SeriesFormatError> {
        let f: f64 = string
            .parse()
            .map_err(|_| SeriesFormatError::ParseFloat {
                line_num,
                string: string.to_string(),
            })?;
        if !f.is_finite() {
            return Err(SeriesFormatError::NonFinite {
                line_num,
                string: string.to_string(),
            });
        }
        Ok(f)
    };

    while buf.read_line(&mut line)? > 0 {
        line_num += 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            line.clear();
            continue;
        }

        if trimmed.starts_with(HEADER_MARKERS) {
            let text = trimmed.trim_start_matches(HEADER_MARKERS).trim();
            if let Some(value) = start_time_value(text) {
                if start.is_some() {
                    return Err(SeriesFormatError::DuplicateStartTime { line_num });
                }
                let bad_start = || SeriesFormatError::BadStartTime {
                    line_num,
                    string: value.to_string(),
                };
                let unix: f64 = value.parse().map_err(|_| bad_start())?;
                if !unix.is_finite() {
                    return Err(bad_start());
                }
                start = Some(Epoch::from_unix_seconds(unix));
            }
            header.push(text.to_string());
            line.clear();
            continue;
        }

        let fields: Vec<&str> = trimmed.split_ascii_whitespace().collect();
        if fields.len() != NUM_COUNTERS + 1 {
            return Err(SeriesFormatError::WrongFieldCount {
                line_num,
                got: fields.len(),
            });
        }
        let elapsed = parse_float(fields[0], line_num)?;
        let mut counters = [0.0; NUM_COUNTERS];
        for (c, field) in counters.iter_mut().zip(&fields[1..]) {
            *c = parse_float(field, line_num)?;
        }

        if let Some(previous) = samples.last() {
            if elapsed < previous.elapsed {
                return Err(SeriesFormatError::TimeGoesBackwards {
                    line_num,
                    elapsed,
                    previous: previous.elapsed,
                });
            }
        }
        trace!("line {line_num}: t = {elapsed} s");
        samples.push(RawSample { elapsed, counters });
        line.clear();
    }

    let samples = Vec1::try_from_vec(samples).map_err(|_| SeriesFormatError::NoRecords)?;
    let start = start.ok_or(SeriesFormatError::NoStartTime)?;
    Ok(CounterSeries::new(samples, header, start))
}

/// If a header line specifies the start time, return the value part.
fn start_time_value(text: &str) -> Option<&str> {
    let (key, value) = text.split_once(':')?;
    if key.trim().eq_ignore_ascii_case(START_KEY) {
        Some(value.trim())
    } else {
        None
    }
}
