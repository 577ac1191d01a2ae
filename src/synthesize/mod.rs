// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Apply a resolved comb equation to every valid sample.
//!
//! Invalid samples are left out entirely, from both the series and the
//! statistics. Statistics use the population standard deviation.

mod error;

pub use error::SynthesisError;

use log::debug;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};
use vec1::Vec1;

use crate::{
    comb::EquationParameters,
    constants::{AUX_COUNTER, IDENTITY_CALIBRATION},
    filter::FilteredSeries,
    math::{polynomial, Stats},
    time::sample_mjd,
};

/// Which repetition rate enters the comb equation per sample.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RepRateSource {
    /// Each sample's own f_rep reading.
    #[default]
    Measured,

    /// The f_rep set point (or, without one, the mean of the valid samples).
    Fixed,
}

/// The quantity of the auxiliary series.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuxQuantity {
    /// The laser frequency with the measured f_rep.
    #[default]
    LaserFrequency,

    /// The laser frequency with the fixed f_rep.
    LaserFrequencyFixed,

    /// The laser frequency with the measured f_rep minus the target.
    DeltaLaserFrequency,

    /// The laser frequency with the fixed f_rep minus the target.
    DeltaLaserFrequencyFixed,
}

impl AuxQuantity {
    pub fn description(self) -> &'static str {
        match self {
            AuxQuantity::LaserFrequency => "laser frequency / Hz",
            AuxQuantity::LaserFrequencyFixed => "laser frequency (fixed f_rep) / Hz",
            AuxQuantity::DeltaLaserFrequency => "laser frequency - target / Hz",
            AuxQuantity::DeltaLaserFrequencyFixed => "laser frequency (fixed f_rep) - target / Hz",
        }
    }

    pub fn is_delta(self) -> bool {
        matches!(
            self,
            AuxQuantity::DeltaLaserFrequency | AuxQuantity::DeltaLaserFrequencyFixed
        )
    }

    /// The quantity that can actually be produced. Without a target, a
    /// difference to the target becomes the absolute quantity.
    pub fn effective(self, has_target: bool) -> AuxQuantity {
        match (self, has_target) {
            (AuxQuantity::DeltaLaserFrequency, false) => AuxQuantity::LaserFrequency,
            (AuxQuantity::DeltaLaserFrequencyFixed, false) => AuxQuantity::LaserFrequencyFixed,
            (q, _) => q,
        }
    }
}

/// The time column of the auxiliary series.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TimeAxis {
    /// Seconds since the start of the series.
    #[default]
    Elapsed,

    /// Modified Julian date (UTC).
    Mjd,
}

impl TimeAxis {
    pub fn description(self) -> &'static str {
        match self {
            TimeAxis::Elapsed => "time / s",
            TimeAxis::Mjd => "MJD / d",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOptions {
    pub rep_source: RepRateSource,

    /// The f_rep set point [Hz].
    pub rep_setpoint: Option<f64>,

    pub aux_quantity: AuxQuantity,
    pub time_axis: TimeAxis,

    /// The frequency the laser is expected to have [Hz].
    pub target: Option<f64>,

    /// Polynomial coefficients converting the auxiliary counter reading,
    /// lowest order first.
    pub aux_calibration: Vec<f64>,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        SynthesisOptions {
            rep_source: RepRateSource::default(),
            rep_setpoint: None,
            aux_quantity: AuxQuantity::default(),
            time_axis: TimeAxis::default(),
            target: None,
            aux_calibration: IDENTITY_CALIBRATION.to_vec(),
        }
    }
}

/// The results for one valid sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultSample {
    /// Seconds since the start of the series.
    pub elapsed: f64,

    /// The measured repetition rate [Hz].
    pub rep: f64,

    /// The measured offset frequency [Hz].
    pub offset: f64,

    /// The measured beat note [Hz].
    pub beat: f64,

    /// The calibrated auxiliary channel.
    pub aux: f64,

    /// The laser frequency [Hz].
    pub laser: f64,
}

/// A tracked quantity in the statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Quantity {
    #[strum(serialize = "repetition rate")]
    RepRate,

    #[strum(serialize = "offset frequency")]
    Offset,

    #[strum(serialize = "beat frequency")]
    Beat,

    #[strum(serialize = "auxiliary channel")]
    Aux,

    #[strum(serialize = "laser frequency")]
    Laser,
}

/// Population statistics of every tracked quantity over the valid samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub rep: Stats,
    pub offset: Stats,
    pub beat: Stats,
    pub aux: Stats,
    pub laser: Stats,
}

impl Statistics {
    /// The statistics table, in report order.
    pub fn rows(&self) -> [(Quantity, Stats); 5] {
        [
            (Quantity::RepRate, self.rep),
            (Quantity::Offset, self.offset),
            (Quantity::Beat, self.beat),
            (Quantity::Aux, self.aux),
            (Quantity::Laser, self.laser),
        ]
    }
}

/// One point of the auxiliary series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxSample {
    /// Elapsed seconds or MJD, depending on the [`TimeAxis`].
    pub time: f64,
    pub value: f64,
}

/// Everything produced from a filtered series and a resolved comb equation.
#[derive(Debug, Clone)]
pub struct ResultSeries {
    samples: Vec1<ResultSample>,
    aux: Vec1<AuxSample>,
    statistics: Statistics,

    /// The f_rep used by "fixed" quantities [Hz].
    fixed_rep: f64,

    /// The auxiliary quantity actually produced.
    aux_quantity: AuxQuantity,
    time_axis: TimeAxis,
    rep_source: RepRateSource,
}

impl ResultSeries {
    pub fn samples(&self) -> &[ResultSample] {
        &self.samples
    }

    pub fn aux(&self) -> &[AuxSample] {
        &self.aux
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn fixed_rep(&self) -> f64 {
        self.fixed_rep
    }

    pub fn aux_quantity(&self) -> AuxQuantity {
        self.aux_quantity
    }

    pub fn time_axis(&self) -> TimeAxis {
        self.time_axis
    }

    pub fn rep_source(&self) -> RepRateSource {
        self.rep_source
    }
}

/// Evaluate the comb equation for every valid sample of `filtered`.
pub fn synthesize(
    filtered: &FilteredSeries,
    params: &EquationParameters,
    options: &SynthesisOptions,
) -> Result<ResultSeries, SynthesisError> {
    let counts = filtered.counts();
    if counts.valid == 0 {
        return Err(SynthesisError::EmptySeries { counts });
    }

    let fixed_rep = options.rep_setpoint.unwrap_or_else(|| filtered.mean_rep());
    if !(fixed_rep.is_finite() && fixed_rep > 0.0) {
        return Err(SynthesisError::InvalidRepRate(fixed_rep));
    }
    let aux_quantity = options.aux_quantity.effective(options.target.is_some());
    let target = options.target.unwrap_or(0.0);
    let variant = filtered.variant();
    let start = filtered.series().start();
    debug!(
        "Synthesising {} samples; f_rep {}, fixed f_rep {fixed_rep} Hz",
        counts.valid, options.rep_source
    );

    let mut samples = Vec::with_capacity(counts.valid);
    let mut aux = Vec::with_capacity(counts.valid);
    for raw in filtered.valid_samples() {
        let rep = raw.rep(variant);
        let beat = raw.beat(variant);
        let laser_measured = params.laser_frequency(rep, beat);
        let laser_fixed = params.laser_frequency(fixed_rep, beat);

        samples.push(ResultSample {
            elapsed: raw.elapsed,
            rep,
            offset: raw.offset(variant),
            beat,
            aux: polynomial(&options.aux_calibration, raw.counters[AUX_COUNTER]),
            laser: match options.rep_source {
                RepRateSource::Measured => laser_measured,
                RepRateSource::Fixed => laser_fixed,
            },
        });

        aux.push(AuxSample {
            time: match options.time_axis {
                TimeAxis::Elapsed => raw.elapsed,
                TimeAxis::Mjd => sample_mjd(start, raw.elapsed),
            },
            value: match aux_quantity {
                AuxQuantity::LaserFrequency => laser_measured,
                AuxQuantity::LaserFrequencyFixed => laser_fixed,
                AuxQuantity::DeltaLaserFrequency => laser_measured - target,
                AuxQuantity::DeltaLaserFrequencyFixed => laser_fixed - target,
            },
        });
    }

    // Neither can be empty; there is at least one valid sample.
    let samples =
        Vec1::try_from_vec(samples).map_err(|_| SynthesisError::EmptySeries { counts })?;
    let aux = Vec1::try_from_vec(aux).map_err(|_| SynthesisError::EmptySeries { counts })?;
    let statistics = statistics(&samples);

    Ok(ResultSeries {
        samples,
        aux,
        statistics,
        fixed_rep,
        aux_quantity,
        time_axis: options.time_axis,
        rep_source: options.rep_source,
    })
}

fn statistics(samples: &Vec1<ResultSample>) -> Statistics {
    let stats = |f: fn(&ResultSample) -> f64| {
        let values: Vec<f64> = samples.iter().map(f).collect();
        // `values` is never empty.
        Stats::from_slice(&values).unwrap_or(Stats {
            mean: f64::NAN,
            std_dev: f64::NAN,
            span: f64::NAN,
        })
    };

    Statistics {
        rep: stats(|s| s.rep),
        offset: stats(|s| s.offset),
        beat: stats(|s| s.beat),
        aux: stats(|s| s.aux),
        laser: stats(|s| s.laser),
    }
}
