// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The raw counter series, as read from a counter log.
//!
//! A [`CounterSeries`] exclusively owns the samples. Everything downstream
//! (filtering, resolution, synthesis) only borrows it.


use hifitime::Epoch;
use vec1::Vec1;

use crate::{
    constants::NUM_COUNTERS,
    hardware::HardwareVariant,
    math::{mean, median},
};

/// One measurement epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Seconds since the start of the series.
    pub elapsed: f64,

    /// The raw counter readings [Hz]. What each counter means depends on the
    /// [`HardwareVariant`].
    pub counters: [f64; NUM_COUNTERS],
}

impl RawSample {
    pub fn rep(&self, variant: HardwareVariant) -> f64 {
        self.counters[variant.roles().rep]
    }

    pub fn offset(&self, variant: HardwareVariant) -> f64 {
        self.counters[variant.roles().offset]
    }

    pub fn beat(&self, variant: HardwareVariant) -> f64 {
        self.counters[variant.roles().beat]
    }
}

/// A whole counter log. There is always at least one sample.
#[derive(Debug, Clone)]
pub struct CounterSeries {
    samples: Vec1<RawSample>,

    /// The header lines of the log, in file order.
    header: Vec<String>,

    /// The absolute time of the start of the series.
    start: Epoch,

    /// Per-counter means over all samples.
    means: [f64; NUM_COUNTERS],
}

impl CounterSeries {
    pub fn new(samples: Vec1<RawSample>, header: Vec<String>, start: Epoch) -> CounterSeries {
        let mut means = [0.0; NUM_COUNTERS];
        for (i_counter, m) in means.iter_mut().enumerate() {
            *m = mean(samples.iter().map(|s| s.counters[i_counter]));
        }

        CounterSeries {
            samples,
            header,
            start,
            means,
        }
    }

    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn start(&self) -> Epoch {
        self.start
    }

    /// The number of raw samples. Never zero.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// The mean of a counter over all raw samples.
    ///
    /// # Panics
    ///
    /// Panics if `counter` is not less than [`NUM_COUNTERS`].
    pub fn counter_mean(&self, counter: usize) -> f64 {
        self.means[counter]
    }

    /// All of the per-counter means.
    pub fn counter_means(&self) -> &[f64; NUM_COUNTERS] {
        &self.means
    }

    /// The median of a counter over all raw samples. Unlike the mean, this is
    /// not pulled around by a handful of cycle slips.
    pub fn counter_median(&self, counter: usize) -> f64 {
        let values: Vec<f64> = self.samples.iter().map(|s| s.counters[counter]).collect();
        median(&values)
    }

    /// The expected repetition rate: the mean of the counter that carries
    /// f_rep for this `variant`. Used as the default f_rep target when
    /// filtering.
    pub fn predicted_rep_rate(&self, variant: HardwareVariant) -> f64 {
        self.counter_mean(variant.roles().rep)
    }
}
