// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions around time.

use hifitime::{Epoch, Unit};

/// The epoch of a sample taken `elapsed` seconds after `start`.
pub(crate) fn sample_epoch(start: Epoch, elapsed: f64) -> Epoch {
    start + elapsed * Unit::Second
}

/// The modified Julian date (UTC) of a sample taken `elapsed` seconds after
/// `start`.
pub(crate) fn sample_mjd(start: Epoch, elapsed: f64) -> f64 {
    sample_epoch(start, elapsed).to_mjd_utc_days()
}
