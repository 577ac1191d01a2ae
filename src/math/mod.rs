// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.
//!
//! Frequencies of hundreds of THz are averaged here, so sums are taken
//! relative to the first value; otherwise a naive sum of squares loses all
//! significant digits.


/// The arithmetic mean of `values`. Returns NaN for an empty iterator.
pub(crate) fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut values = values.into_iter();
    let first = match values.next() {
        Some(v) => v,
        None => return f64::NAN,
    };

    let mut count = 1;
    let mut sum_diff = 0.0;
    for v in values {
        sum_diff += v - first;
        count += 1;
    }
    first + sum_diff / count as f64
}

/// Population statistics of a quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub mean: f64,

    /// The population standard deviation, i.e. the sum of squared deviations
    /// is divided by `n`, not `n - 1`.
    pub std_dev: f64,

    /// max - min.
    pub span: f64,
}

impl Stats {
    /// Returns `None` if there are no values.
    pub(crate) fn from_slice(values: &[f64]) -> Option<Stats> {
        if values.is_empty() {
            return None;
        }

        let mean = mean(values.iter().copied());
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
                (min.min(v), max.max(v))
            });

        Some(Stats {
            mean,
            std_dev: variance.sqrt(),
            span: max - min,
        })
    }
}

/// The median of `values`. For an even count, the mean of the two middle
/// values is used. Returns NaN if there are no values.
pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Evaluate the polynomial `coeffs[0] + coeffs[1] x + coeffs[2] x^2 + ...`.
pub(crate) fn polynomial(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}
