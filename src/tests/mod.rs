// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpful functions for tests.

use hifitime::Epoch;
use vec1::Vec1;

use crate::{
    constants::NUM_COUNTERS,
    hardware::HardwareVariant,
    series::{CounterSeries, RawSample},
};

/// The Unix time at the start of every synthetic series.
pub(crate) const START_UNIX: f64 = 1_700_000_000.0;

/// The MJD of the Unix epoch.
pub(crate) const MJD_OF_UNIX_EPOCH: f64 = 40587.0;

/// A sample with f_rep, f_off and f_beat on the counters of `variant`, the
/// auxiliary channel set to 1.0 and all other counters zero.
pub(crate) fn sample(
    variant: HardwareVariant,
    elapsed: f64,
    rep: f64,
    offset: f64,
    beat: f64,
) -> RawSample {
    let roles = variant.roles();
    let mut counters = [0.0; NUM_COUNTERS];
    counters[roles.rep] = rep;
    counters[roles.offset] = offset;
    counters[roles.beat] = beat;
    counters[crate::constants::AUX_COUNTER] = 1.0;
    RawSample { elapsed, counters }
}

/// `n` identical samples, one per second.
pub(crate) fn constant_series(
    variant: HardwareVariant,
    n: usize,
    rep: f64,
    offset: f64,
    beat: f64,
) -> CounterSeries {
    let samples = (0..n)
        .map(|i| sample(variant, i as f64, rep, offset, beat))
        .collect();
    series_from_samples(samples)
}

pub(crate) fn series_from_samples(samples: Vec<RawSample>) -> CounterSeries {
    CounterSeries::new(
        Vec1::try_from_vec(samples).expect("at least one sample"),
        vec!["synthetic".to_string()],
        Epoch::from_unix_seconds(START_UNIX),
    )
}

/// The text of a variant A counter log with one record per second, with the
/// given repetition rate, offset and beat frequencies.
pub(crate) fn counter_log_text(rep: f64, offset: f64, beats: &[f64]) -> String {
    let mut text = format!("# synthetic counter log\n# start: {START_UNIX}\n");
    for (i, beat) in beats.iter().enumerate() {
        text.push_str(&format!("{i} {rep} {offset} {beat} 1 0 0 0\n"));
    }
    text
}
