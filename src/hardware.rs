// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Which counters of a log record play which role in the comb equation.
//!
//! The comb electronics have two banks of counters. Depending on how the
//! beat detection units are wired, the repetition rate, offset and beat
//! signals land on different counters.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use thiserror::Error;

/// The wiring of the counters. Exactly one is active per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum HardwareVariant {
    /// Counters 0, 1 and 2.
    #[strum(serialize = "A")]
    A = 0,

    /// Counters 4, 5 and 6.
    #[strum(serialize = "B")]
    B = 1,
}

/// The counter indices of a single [`HardwareVariant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterRoles {
    /// The comb repetition rate.
    pub rep: usize,

    /// The comb carrier-envelope offset frequency.
    pub offset: usize,

    /// The beat note between the CW laser and the nearest comb tooth.
    pub beat: usize,
}

/// The lookup table from [`HardwareVariant`] (by discriminant) to its
/// counters.
const ROLES: [CounterRoles; 2] = [
    CounterRoles {
        rep: 0,
        offset: 1,
        beat: 2,
    },
    CounterRoles {
        rep: 4,
        offset: 5,
        beat: 6,
    },
];

impl HardwareVariant {
    pub fn roles(self) -> CounterRoles {
        ROLES[self as usize]
    }

    /// The counter number printed in reports (1-based, as labelled on the
    /// hardware).
    pub fn number(self) -> u8 {
        match self {
            HardwareVariant::A => 1,
            HardwareVariant::B => 2,
        }
    }
}

impl FromStr for HardwareVariant {
    type Err = UnknownHardwareVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "a" => Ok(HardwareVariant::A),
            "2" | "b" => Ok(HardwareVariant::B),
            _ => Err(UnknownHardwareVariant(s.to_string())),
        }
    }
}

#[derive(Error, Debug)]
#[error("Hardware variant '{0}' is unknown; valid variants are 1 (A) and 2 (B)")]
pub struct UnknownHardwareVariant(pub String);

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_every_variant_has_distinct_counters() {
        for variant in HardwareVariant::iter() {
            let roles = variant.roles();
            assert_ne!(roles.rep, roles.offset);
            assert_ne!(roles.rep, roles.beat);
            assert_ne!(roles.offset, roles.beat);
            assert!(roles.beat < crate::constants::NUM_COUNTERS);
            assert_ne!(roles.rep, crate::constants::AUX_COUNTER);
        }
    }

    #[test]
    fn test_parse_variant() {
        assert_eq!("1".parse::<HardwareVariant>().unwrap(), HardwareVariant::A);
        assert_eq!(" b ".parse::<HardwareVariant>().unwrap(), HardwareVariant::B);
        assert!("3".parse::<HardwareVariant>().is_err());
        assert!("".parse::<HardwareVariant>().is_err());
    }

    #[test]
    fn test_variant_b_roles() {
        let roles = HardwareVariant::B.roles();
        assert_eq!(roles.rep, 4);
        assert_eq!(roles.offset, 5);
        assert_eq!(roles.beat, 6);
    }
}
