// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from synthesising results.

use thiserror::Error;

use crate::filter::OutlierCounts;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("No valid samples remain after filtering {} samples ({} rejected by f_rep, {} by f_off, {} by cycle slips)", counts.raw, counts.rep, counts.offset, counts.cycle_slip)]
    EmptySeries { counts: OutlierCounts },

    #[error("The fixed repetition rate must be positive and finite (got {0} Hz)")]
    InvalidRepRate(f64),
}
