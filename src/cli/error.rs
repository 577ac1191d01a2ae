// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all comb-cal-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use super::evaluate::EvaluateArgsError;
use crate::{
    comb::UnknownCombType,
    hardware::UnknownHardwareVariant,
    io::{read::SeriesReadError, write::FileWriteError},
    params::EvaluateError,
    reference::ReferenceTableError,
    resolve::ResolveError,
    synthesize::SynthesisError,
};

/// The *only* publicly visible error from comb-cal. Each message should carry
/// a hint of what to do about it, unless it's "generic".
#[derive(Error, Debug)]
pub enum CombCalError {
    /// An error related to evaluate arguments.
    #[error("{0}\n\nSee `comb-cal evaluate --help` for the available options.")]
    Evaluate(String),

    /// An error related to reading counter logs.
    #[error("{0}\n\nCounter logs start with '#' or '%' header lines, one of which is 'start: <Unix seconds>', followed by records of the elapsed time and 7 counter readings.")]
    SeriesRead(String),

    /// An error related to resolving the comb equation.
    #[error("{0}\n\nThe mode number and signs are found from a target frequency (optionally with a mode number or the signs), from a reference table, or are given outright with a mode number and signs.")]
    Resolve(String),

    /// An error related to the result series.
    #[error("{0}\n\nTry loosening the outlier tolerances, or switching filtering off with --no-filter.")]
    Synthesis(String),

    /// An error related to writing output files.
    #[error("{0}")]
    FileWrite(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files use the long names of the command-line options as keys.")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<EvaluateArgsError> for CombCalError {
    fn from(e: EvaluateArgsError) -> Self {
        match e {
            EvaluateArgsError::OutputIsInput(_) => Self::FileWrite(e.to_string()),
            _ => Self::Evaluate(e.to_string()),
        }
    }
}

impl From<EvaluateError> for CombCalError {
    fn from(e: EvaluateError) -> Self {
        match e {
            EvaluateError::Resolve(e) => Self::from(e),
            EvaluateError::Synthesis(e) => Self::from(e),
            EvaluateError::FileWrite(e) => Self::from(e),
        }
    }
}

impl From<SeriesReadError> for CombCalError {
    fn from(e: SeriesReadError) -> Self {
        Self::SeriesRead(e.to_string())
    }
}

impl From<ResolveError> for CombCalError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::InvalidRepRate(_) | ResolveError::InvalidBeat(_) => {
                Self::Synthesis(e.to_string())
            }
            _ => Self::Resolve(e.to_string()),
        }
    }
}

impl From<SynthesisError> for CombCalError {
    fn from(e: SynthesisError) -> Self {
        Self::Synthesis(e.to_string())
    }
}

impl From<FileWriteError> for CombCalError {
    fn from(e: FileWriteError) -> Self {
        match e {
            FileWriteError::IO(e) => Self::from(e),
            _ => Self::FileWrite(e.to_string()),
        }
    }
}

impl From<UnknownHardwareVariant> for CombCalError {
    fn from(e: UnknownHardwareVariant) -> Self {
        Self::Evaluate(e.to_string())
    }
}

impl From<UnknownCombType> for CombCalError {
    fn from(e: UnknownCombType) -> Self {
        Self::Evaluate(e.to_string())
    }
}

impl From<ReferenceTableError> for CombCalError {
    fn from(e: ReferenceTableError) -> Self {
        Self::Resolve(e.to_string())
    }
}

impl From<std::io::Error> for CombCalError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
