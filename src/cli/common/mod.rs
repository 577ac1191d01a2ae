// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Things shared between `comb-cal` subcommands: argument files, help texts
//! and the pretty printers.

mod printers;

pub(crate) use printers::{display_warnings, InfoPrinter, Warn};

use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    comb::COMB_TYPES_COMMA_SEPARATED,
    constants::{
        DEFAULT_CYCLE_SLIP_TOLERANCE, DEFAULT_FOFF_TOLERANCE, DEFAULT_FREP_TOLERANCE,
        DEFAULT_RESOLUTION_EPSILON,
    },
    synthesize::AuxQuantity,
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    pub(super) static ref VARIANT_HELP: String =
        "Which bank of counters carries the comb signals: 1 (A; counters 0, 1, 2) or 2 (B; counters 4, 5, 6). Default: 1".to_string();

    pub(super) static ref COMB_TYPE_HELP: String =
        format!("The comb generator, by number or name. Supported: {}. Default: 0 (Generic)", *COMB_TYPES_COMMA_SEPARATED);

    pub(super) static ref FREP_TOLERANCE_HELP: String =
        format!("Samples whose repetition rate is further than this from its set point are outliers [Hz]. A value <= 0 disables this check. Default: {DEFAULT_FREP_TOLERANCE}");

    pub(super) static ref FOFF_TOLERANCE_HELP: String =
        format!("Samples whose offset frequency is further than this from the comb's design value are outliers [Hz]. A value <= 0 disables this check. Default: {DEFAULT_FOFF_TOLERANCE}");

    pub(super) static ref CYCLE_SLIP_TOLERANCE_HELP: String =
        format!("Samples whose beat frequency is further than this from the beat set point are cycle slips [Hz]. A value <= 0 disables this check. Default: {DEFAULT_CYCLE_SLIP_TOLERANCE}");

    pub(super) static ref EPSILON_HELP: String =
        format!("Candidate solutions whose residuals are within this of the best are considered equally good, which makes the resolution ambiguous [Hz]. Default: {DEFAULT_RESOLUTION_EPSILON}");

    pub(super) static ref AUX_QUANTITY_HELP: String =
        format!("The quantity written to the auxiliary file. Supported: {}. Default: {}",
                AuxQuantity::iter().join(", "), AuxQuantity::default());
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(CombCalError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(CombCalError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(CombCalError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}
