// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Absolute frequency evaluation of CW lasers from optical frequency comb
//! counter logs.
//!
//! A counter log is filtered for outliers ([`filter`]), the comb equation
//! f_laser = N f_rep + s_beat f_beat + s_off f_off is resolved ([`resolve`])
//! and then evaluated for every valid sample ([`synthesize`]).

pub mod comb;
pub mod filter;
pub mod hardware;
pub mod io;
pub mod math;
pub mod reference;
pub mod resolve;
pub mod series;
pub mod synthesize;

mod cli;
mod constants;
mod params;
mod time;

#[cfg(test)]
mod tests;

// Re-exports.
pub use cli::{CombCal, CombCalError};
