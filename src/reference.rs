// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Known transition frequencies of reference lasers.
//!
//! A laser stabilised to one of these transitions can be evaluated without
//! the operator knowing the mode number or the signs; the transition closest
//! to a consistent comb solution is picked.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vec1::Vec1;

/// A single known transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// The component label, e.g. "f".
    pub label: String,

    /// The absolute frequency [Hz].
    pub frequency: f64,
}

/// A non-empty list of known transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ReferenceEntry>", into = "Vec<ReferenceEntry>")]
pub struct ReferenceTable {
    entries: Vec1<ReferenceEntry>,
}

impl ReferenceTable {
    pub fn new(entries: Vec<ReferenceEntry>) -> Result<ReferenceTable, ReferenceTableError> {
        let entries = Vec1::try_from_vec(entries).map_err(|_| ReferenceTableError::Empty)?;
        for e in &entries {
            if !(e.frequency.is_finite() && e.frequency > 0.0) {
                return Err(ReferenceTableError::BadFrequency {
                    label: e.label.clone(),
                    frequency: e.frequency,
                });
            }
        }
        Ok(ReferenceTable { entries })
    }

    /// The hyperfine components d, e, f and g of the 127I2 R(127) 11-5
    /// transition used to stabilise 633 nm He-Ne lasers (CIPM 2003).
    pub fn iodine_633() -> ReferenceTable {
        let entry = |label: &str, khz: f64| ReferenceEntry {
            label: label.to_string(),
            frequency: khz * 1e3,
        };
        ReferenceTable {
            entries: vec1::vec1![
                entry("d", 473_612_379_829.0),
                entry("e", 473_612_340_492.0),
                entry("f", 473_612_353_604.0),
                entry("g", 473_612_366_967.0),
            ],
        }
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }
}

impl TryFrom<Vec<ReferenceEntry>> for ReferenceTable {
    type Error = ReferenceTableError;

    fn try_from(entries: Vec<ReferenceEntry>) -> Result<Self, Self::Error> {
        ReferenceTable::new(entries)
    }
}

impl From<ReferenceTable> for Vec<ReferenceEntry> {
    fn from(table: ReferenceTable) -> Self {
        table.entries.into_vec()
    }
}

impl Default for ReferenceTable {
    fn default() -> Self {
        ReferenceTable::iodine_633()
    }
}

#[derive(Error, Debug)]
pub enum ReferenceTableError {
    #[error("The reference table has no entries")]
    Empty,

    #[error("Reference table entry '{label}' has an invalid frequency ({frequency} Hz)")]
    BadFrequency { label: String, frequency: f64 },
}
