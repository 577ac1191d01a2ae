// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Flag samples spoiled by instrument artefacts.
//!
//! Three independent criteria are available, each enabled by the presence of
//! its tolerance:
//!
//! 1. f_rep away from its target (the comb lost lock),
//! 2. f_off away from the comb design value (offset lock lost),
//! 3. f_beat away from its reference (a cycle slip of the beat counter).
//!
//! Every criterion is evaluated for every sample, so one sample may be
//! counted against several criteria. A sample is valid iff no criterion flags
//! it.
//!
//! The cycle-slip reference is a fixed value (the beat set point), not a
//! running average, so the verdict on one sample never depends on another.


use crate::{
    hardware::HardwareVariant,
    series::{CounterSeries, RawSample},
};

/// What a sample is checked against. `None` tolerances disable their
/// criterion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCriteria {
    pub variant: HardwareVariant,

    /// The expected f_rep [Hz]. If this is `None`, f_rep is not checked, even
    /// if a tolerance is given.
    pub target_rep: Option<f64>,
    pub rep_tolerance: Option<f64>,

    /// The comb's fundamental offset frequency set point [Hz].
    pub target_offset: f64,
    pub offset_tolerance: Option<f64>,

    /// The expected beat note [Hz]. The cycle-slip criterion is inactive
    /// without it.
    pub target_beat: Option<f64>,
    pub cycle_slip_tolerance: Option<f64>,
}

impl FilterCriteria {
    /// Criteria that flag nothing.
    pub fn none(variant: HardwareVariant, target_offset: f64) -> FilterCriteria {
        FilterCriteria {
            variant,
            target_rep: None,
            rep_tolerance: None,
            target_offset,
            offset_tolerance: None,
            target_beat: None,
            cycle_slip_tolerance: None,
        }
    }

    fn rep_check(&self) -> Option<(f64, f64)> {
        self.target_rep.zip(self.rep_tolerance)
    }

    fn offset_check(&self) -> Option<(f64, f64)> {
        self.offset_tolerance.map(|tol| (self.target_offset, tol))
    }

    fn cycle_slip_check(&self) -> Option<(f64, f64)> {
        self.target_beat.zip(self.cycle_slip_tolerance)
    }

    pub fn rep_active(&self) -> bool {
        self.rep_check().is_some()
    }

    pub fn offset_active(&self) -> bool {
        self.offset_check().is_some()
    }

    pub fn cycle_slip_active(&self) -> bool {
        self.cycle_slip_check().is_some()
    }

    /// Which criteria flag this sample.
    pub fn evaluate(&self, sample: &RawSample) -> SampleFlags {
        let outside = |check: Option<(f64, f64)>, value: f64| match check {
            // A non-finite reading is never within tolerance.
            Some((target, tolerance)) => {
                !value.is_finite() || (value - target).abs() > tolerance
            }
            None => false,
        };

        SampleFlags {
            rep: outside(self.rep_check(), sample.rep(self.variant)),
            offset: outside(self.offset_check(), sample.offset(self.variant)),
            cycle_slip: outside(self.cycle_slip_check(), sample.beat(self.variant)),
        }
    }
}

/// The verdict of each criterion on a single sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleFlags {
    pub rep: bool,
    pub offset: bool,
    pub cycle_slip: bool,
}

impl SampleFlags {
    pub fn is_valid(&self) -> bool {
        !(self.rep || self.offset || self.cycle_slip)
    }
}

/// Aggregate outlier counts of a [`FilteredSeries`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutlierCounts {
    pub raw: usize,
    pub valid: usize,

    /// The number of samples flagged by each criterion. A sample flagged by
    /// several criteria counts once in each.
    pub rep: usize,
    pub offset: usize,
    pub cycle_slip: usize,
}

impl OutlierCounts {
    /// The number of invalid samples (samples flagged by any criterion).
    pub fn outliers(&self) -> usize {
        self.raw - self.valid
    }

    /// The percentage of invalid samples.
    pub fn outlier_percentage(&self) -> f64 {
        if self.raw == 0 {
            0.0
        } else {
            100.0 * self.outliers() as f64 / self.raw as f64
        }
    }
}

/// A [`CounterSeries`] together with a verdict for each of its samples. The
/// series itself is left untouched.
#[derive(Debug, Clone)]
pub struct FilteredSeries<'a> {
    series: &'a CounterSeries,
    criteria: FilterCriteria,
    flags: Vec<SampleFlags>,
    counts: OutlierCounts,
}

impl<'a> FilteredSeries<'a> {
    /// Mark every sample of `series` against `criteria`.
    pub fn apply(series: &'a CounterSeries, criteria: FilterCriteria) -> FilteredSeries<'a> {
        let flags: Vec<SampleFlags> = series
            .samples()
            .iter()
            .map(|s| criteria.evaluate(s))
            .collect();

        let mut counts = OutlierCounts {
            raw: flags.len(),
            ..Default::default()
        };
        for f in &flags {
            counts.rep += usize::from(f.rep);
            counts.offset += usize::from(f.offset);
            counts.cycle_slip += usize::from(f.cycle_slip);
            counts.valid += usize::from(f.is_valid());
        }

        FilteredSeries {
            series,
            criteria,
            flags,
            counts,
        }
    }

    pub fn series(&self) -> &'a CounterSeries {
        self.series
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn variant(&self) -> HardwareVariant {
        self.criteria.variant
    }

    pub fn flags(&self) -> &[SampleFlags] {
        &self.flags
    }

    pub fn counts(&self) -> OutlierCounts {
        self.counts
    }

    /// Iterate over the valid samples, in order.
    pub fn valid_samples(&self) -> impl Iterator<Item = &'a RawSample> + '_ {
        self.series
            .samples()
            .iter()
            .zip(&self.flags)
            .filter(|(_, f)| f.is_valid())
            .map(|(s, _)| s)
    }

    /// The mean f_rep over valid samples. NaN if there are none.
    pub fn mean_rep(&self) -> f64 {
        let variant = self.variant();
        crate::math::mean(self.valid_samples().map(|s| s.rep(variant)))
    }

    /// The mean f_beat over valid samples. NaN if there are none.
    pub fn mean_beat(&self) -> f64 {
        let variant = self.variant();
        crate::math::mean(self.valid_samples().map(|s| s.beat(variant)))
    }
}
