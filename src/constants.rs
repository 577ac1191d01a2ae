// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All frequencies are in Hz and *must* be double precision. A laser frequency
near 474 THz still has a resolution of ~0.06 Hz as an `f64`, which is well
below the counter resolution.
 */

/// The number of frequency counters in a counter log record.
pub const NUM_COUNTERS: usize = 7;

/// The counter carrying the auxiliary analog channel (laser tuning voltage).
pub const AUX_COUNTER: usize = 3;

/// Two candidate laser frequencies that are closer to the target than this
/// (in Hz) are considered to be indistinguishable.
pub const DEFAULT_RESOLUTION_EPSILON: f64 = 1.0;

/// The default f_rep tolerance used when filtering [Hz].
pub const DEFAULT_FREP_TOLERANCE: f64 = 0.5;

/// The default f_off tolerance used when filtering [Hz].
pub const DEFAULT_FOFF_TOLERANCE: f64 = 1000.0;

/// The default cycle-slip tolerance of f_beat [Hz].
pub const DEFAULT_CYCLE_SLIP_TOLERANCE: f64 = 1000.0;

/// The calibration polynomial of the auxiliary channel that leaves readings
/// untouched.
pub const IDENTITY_CALIBRATION: [f64; 2] = [0.0, 1.0];

/// The separator between the header of a main output file and its data.
pub const OUTPUT_SEPARATOR: &str = "@@@@";

/// The extension of counter logs, added to input paths that don't have one.
pub const INPUT_EXTENSION: &str = "dat";

/// The extension of the main output file when its name is derived from the
/// input.
pub const MAIN_OUTPUT_EXTENSION: &str = "prn";

/// The extension of the auxiliary output file when its name is derived from
/// the input.
pub const AUX_OUTPUT_EXTENSION: &str = "txt";
