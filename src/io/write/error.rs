// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from writing out results.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileWriteError {
    #[error("Cannot write to the specified file '{file}'. Do you have write permissions set?")]
    FileNotWritable { file: String },

    #[error(
        "Couldn't create directory '{0}' for output files. Do you have write permissions set?"
    )]
    NewDirectory(PathBuf),

    #[error("'{0}' is a directory, not a file")]
    IsADirectory(PathBuf),

    #[cfg(not(feature = "plotting"))]
    #[error("comb-cal was not compiled with the \"plotting\" feature.\nYou need to compile comb-cal from source with this feature to plot results.")]
    NoPlottingFeature,

    #[cfg(feature = "plotting")]
    #[error("While plotting: {0}")]
    Plot(String),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
