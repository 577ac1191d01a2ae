// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The comb equation and the combs it is evaluated for.
//!
//! ```text
//! f_laser = N f_rep + s_beat f_beat + s_off f_off
//! ```
//!
//! For frequency-doubled ("SHG") combs, f_off is twice the fundamental offset
//! frequency that is counted and locked.


use std::{fmt, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// The combs we know about.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum CombType {
    Generic,
    BevFiberShg,
    BevFiber,
    BevTiSa,
    CmiTiSa,
    BevUln,
    BevUlnShg,
}

impl CombType {
    /// The number used to select this comb type on the command line.
    pub fn number(self) -> u8 {
        CombType::iter()
            .position(|ct| ct == self)
            .map(|p| p as u8)
            .unwrap_or(0)
    }

    pub fn description(self) -> &'static str {
        match self {
            CombType::Generic => "Generic comb",
            CombType::BevFiberShg => "BEV fiber comb, frequency doubled",
            CombType::BevFiber => "BEV fiber comb",
            CombType::BevTiSa => "BEV Ti:sapphire comb",
            CombType::CmiTiSa => "CMI Ti:sapphire comb",
            CombType::BevUln => "BEV ultra-low-noise fiber comb",
            CombType::BevUlnShg => "BEV ultra-low-noise fiber comb, frequency doubled",
        }
    }

    /// The fundamental offset frequency the comb is locked to [Hz].
    pub fn fundamental_offset(self) -> f64 {
        match self {
            CombType::Generic | CombType::BevFiber | CombType::BevFiberShg => 20e6,
            CombType::BevTiSa | CombType::CmiTiSa => 35e6,
            CombType::BevUln | CombType::BevUlnShg => 10e6,
        }
    }

    /// How many times f_off enters the comb equation.
    pub fn offset_multiplier(self) -> f64 {
        match self {
            CombType::BevFiberShg | CombType::BevUlnShg => 2.0,
            _ => 1.0,
        }
    }

    /// Parse either the comb type number or its name.
    pub fn parse(s: &str) -> Result<CombType, UnknownCombType> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return CombType::iter()
                .nth(n)
                .ok_or_else(|| UnknownCombType(s.to_string()));
        }
        CombType::from_str(s).map_err(|_| UnknownCombType(s.to_string()))
    }
}

lazy_static::lazy_static! {
    /// The selectable comb types, e.g. "0 (Generic), 1 (BevFiberShg), ...".
    pub static ref COMB_TYPES_COMMA_SEPARATED: String = CombType::iter()
        .enumerate()
        .map(|(i, ct)| format!("{i} ({})", <&str>::from(ct)))
        .join(", ");
}

#[derive(Error, Debug)]
#[error("Comb type '{0}' is unknown; valid comb types are: {}", *COMB_TYPES_COMMA_SEPARATED)]
pub struct UnknownCombType(pub String);

/// Everything about a comb the comb equation needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombDescriptor {
    pub name: String,

    /// The fundamental offset frequency set point [Hz]. This is what the
    /// offset counter reads.
    pub fundamental_offset: f64,

    pub offset_multiplier: f64,
}

impl CombDescriptor {
    /// The descriptor of a known comb, optionally with a different offset
    /// frequency.
    pub fn new(comb_type: CombType, fundamental_offset: Option<f64>) -> CombDescriptor {
        CombDescriptor {
            name: comb_type.description().to_string(),
            fundamental_offset: fundamental_offset.unwrap_or_else(|| comb_type.fundamental_offset()),
            offset_multiplier: comb_type.offset_multiplier(),
        }
    }

    /// The f_off of the comb equation [Hz].
    pub fn equation_offset(&self) -> f64 {
        self.offset_multiplier * self.fundamental_offset
    }
}

/// A sign of the comb equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub const BOTH: [Sign; 2] = [Sign::Positive, Sign::Negative];

    pub fn value(self) -> f64 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }

    pub fn word(self) -> &'static str {
        match self {
            Sign::Positive => "positive",
            Sign::Negative => "negative",
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Positive => write!(f, "+"),
            Sign::Negative => write!(f, "-"),
        }
    }
}

impl FromStr for Sign {
    type Err = InvalidSign;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "+" | "+1" | "1" | "p" | "pos" | "positive" => Ok(Sign::Positive),
            "-" | "-1" | "n" | "neg" | "negative" => Ok(Sign::Negative),
            _ => Err(InvalidSign(s.to_string())),
        }
    }
}

#[derive(Error, Debug)]
#[error("'{0}' is not a sign; use '+' or '-'")]
pub struct InvalidSign(pub String);

/// The signs of the beat and offset terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signs {
    pub beat: Sign,
    pub offset: Sign,
}

impl Signs {
    /// All four sign combinations.
    pub fn all() -> [Signs; 4] {
        let mut combos = [Signs {
            beat: Sign::Positive,
            offset: Sign::Positive,
        }; 4];
        let mut i = 0;
        for beat in Sign::BOTH {
            for offset in Sign::BOTH {
                combos[i] = Signs { beat, offset };
                i += 1;
            }
        }
        combos
    }
}

impl fmt::Display for Signs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "beat {}, offset {}", self.beat, self.offset)
    }
}

/// The comb equation with everything resolved. Given per-sample f_rep and
/// f_beat, this determines the laser frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationParameters {
    pub comb: CombDescriptor,

    /// The mode number N.
    pub mode: u64,

    pub signs: Signs,
}

impl EquationParameters {
    /// The laser frequency [Hz] for a repetition rate and beat note [Hz].
    pub fn laser_frequency(&self, rep: f64, beat: f64) -> f64 {
        comb_equation(
            self.mode,
            self.signs,
            rep,
            beat,
            self.comb.equation_offset(),
        )
    }
}

/// f_laser = N f_rep + s_beat f_beat + s_off f_off
pub fn comb_equation(mode: u64, signs: Signs, rep: f64, beat: f64, offset: f64) -> f64 {
    mode as f64 * rep + signs.beat.value() * beat + signs.offset.value() * offset
}
