// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from resolving the comb equation.

use itertools::Itertools;
use thiserror::Error;

use super::Candidate;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Cannot determine the comb equation from {0}; supply a target frequency, or a mode number and signs, or use the reference table")]
    Underdetermined(Underdetermined),

    #[error("The signs of the comb equation are ambiguous within {epsilon} Hz of the target {target} Hz. Candidates:\n{}", format_candidates(candidates))]
    AmbiguousSigns {
        target: f64,
        epsilon: f64,
        candidates: Vec<Candidate>,
    },

    #[error("The mode number and signs of the comb equation are ambiguous within {epsilon} Hz. Candidates:\n{}", format_candidates(candidates))]
    AmbiguousMode {
        epsilon: f64,
        candidates: Vec<Candidate>,
    },

    #[error("No positive mode number is consistent with the target {target} Hz")]
    NoPositiveMode { target: f64 },

    #[error("The target frequency must be positive and finite (got {0} Hz)")]
    InvalidTarget(f64),

    #[error("The mode number must be positive")]
    ZeroMode,

    #[error("The repetition rate must be positive and finite (got {0} Hz)")]
    InvalidRepRate(f64),

    #[error("The mean beat frequency is not finite ({0} Hz); are there any valid samples?")]
    InvalidBeat(f64),
}

/// What the operator supplied when that is not enough to resolve the comb
/// equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Underdetermined {
    /// A mode number without any signs or a target.
    ModeOnly,

    Nothing,
}

impl std::fmt::Display for Underdetermined {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Underdetermined::ModeOnly => write!(f, "a mode number alone"),
            Underdetermined::Nothing => write!(f, "nothing"),
        }
    }
}

fn format_candidates(candidates: &[Candidate]) -> String {
    candidates.iter().map(|c| format!("  {c}")).join("\n")
}
