// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Resolve the mode number and signs of the comb equation.
//!
//! The operator rarely knows everything about the comb equation. Depending on
//! what is known (see [`ResolutionSpec`]), the unknowns are determined from a
//! target frequency and the measured mean repetition rate and beat note.
//! Nothing here touches the samples themselves.

mod error;

pub use error::{ResolveError, Underdetermined};

use std::{borrow::Cow, fmt};

use log::{debug, trace};

use crate::{
    comb::{comb_equation, CombDescriptor, EquationParameters, Sign, Signs},
    reference::ReferenceTable,
};

/// What is known about the comb equation before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionSpec {
    /// The mode number and signs are given; nothing to do.
    Fixed { mode: u64, signs: Signs },

    /// The mode number is determined from the target.
    TargetAndSigns { target: f64, signs: Signs },

    /// The signs are determined from the target.
    TargetAndMode { target: f64, mode: u64 },

    /// The mode number and signs are determined from the target.
    TargetOnly { target: f64 },

    /// The laser is locked to one of the transitions in the table.
    ReferenceTable(ReferenceTable),
}

impl ResolutionSpec {
    /// A short description for reports.
    pub fn describe(&self) -> &'static str {
        match self {
            ResolutionSpec::Fixed { .. } => "mode number and signs given",
            ResolutionSpec::TargetAndSigns { .. } => "mode number from target",
            ResolutionSpec::TargetAndMode { .. } => "signs from target",
            ResolutionSpec::TargetOnly { .. } => "mode number and signs from target",
            ResolutionSpec::ReferenceTable(_) => "reference table",
        }
    }

    /// The target frequency [Hz], if there is one.
    pub fn target(&self) -> Option<f64> {
        match self {
            ResolutionSpec::TargetAndSigns { target, .. }
            | ResolutionSpec::TargetAndMode { target, .. }
            | ResolutionSpec::TargetOnly { target } => Some(*target),
            ResolutionSpec::Fixed { .. } | ResolutionSpec::ReferenceTable(_) => None,
        }
    }
}

/// Everything the operator may have said about the comb equation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionInputs {
    pub target: Option<f64>,
    pub mode: Option<u64>,
    pub beat_sign: Option<Sign>,
    pub offset_sign: Option<Sign>,
    pub reference_table: Option<ReferenceTable>,
}

impl ResolutionInputs {
    /// Work out which resolution algorithm applies.
    pub fn into_spec(self) -> Result<ResolutionSpec, ResolveError> {
        if let Some(target) = self.target {
            if !(target.is_finite() && target > 0.0) {
                return Err(ResolveError::InvalidTarget(target));
            }
        }
        if self.mode == Some(0) {
            return Err(ResolveError::ZeroMode);
        }

        if let Some(table) = self.reference_table {
            return Ok(ResolutionSpec::ReferenceTable(table));
        }

        let signs = match (self.beat_sign, self.offset_sign) {
            (None, None) => None,
            (beat, offset) => Some(Signs {
                beat: beat.unwrap_or(Sign::Positive),
                offset: offset.unwrap_or(Sign::Positive),
            }),
        };

        let spec = match (self.target, self.mode, signs) {
            (_, Some(mode), Some(signs)) => ResolutionSpec::Fixed { mode, signs },
            (Some(target), None, Some(signs)) => ResolutionSpec::TargetAndSigns { target, signs },
            (Some(target), Some(mode), None) => ResolutionSpec::TargetAndMode { target, mode },
            (Some(target), None, None) => ResolutionSpec::TargetOnly { target },
            (None, Some(_), None) => {
                return Err(ResolveError::Underdetermined(Underdetermined::ModeOnly))
            }
            (None, None, _) => return Err(ResolveError::Underdetermined(Underdetermined::Nothing)),
        };
        Ok(spec)
    }

    /// Notes on inputs that are ignored or filled in by [`Self::into_spec`].
    pub fn notes(&self) -> Vec<Cow<'static, str>> {
        let mut notes = vec![];
        if self.reference_table.is_some() {
            if self.target.is_some() || self.mode.is_some() {
                notes.push("Using the reference table; the target and mode number are ignored".into());
            }
            if self.beat_sign.is_some() || self.offset_sign.is_some() {
                notes.push("Using the reference table; the signs are ignored".into());
            }
            return notes;
        }

        match (self.beat_sign, self.offset_sign) {
            (Some(_), None) => notes.push("No offset sign given; assuming +".into()),
            (None, Some(_)) => notes.push("No beat sign given; assuming +".into()),
            _ => (),
        }
        let has_signs = self.beat_sign.is_some() || self.offset_sign.is_some();
        if self.mode.is_some() && has_signs && self.target.is_some() {
            notes.push("The mode number and signs are given; the target frequency is ignored".into());
        }
        notes
    }
}

/// A fully determined comb equation evaluated at the measured means.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub mode: u64,
    pub signs: Signs,

    /// The laser frequency this candidate yields [Hz].
    pub laser: f64,

    /// |laser - target| [Hz]. Zero if there is no target.
    pub residual: f64,

    /// The reference table component this candidate was resolved against.
    pub label: Option<String>,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "component {label}: ")?;
        }
        write!(
            f,
            "N = {}, {}: {:.1} Hz (residual {:.1} Hz)",
            self.mode, self.signs, self.laser, self.residual
        )
    }
}

/// The result of resolving the comb equation.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub params: EquationParameters,

    /// The laser frequency at the measured means [Hz].
    pub laser: f64,

    /// The distance between the laser frequency and the target [Hz], if there
    /// is a target.
    pub residual: Option<f64>,

    /// The reference table component the laser was found to be locked to.
    pub reference_label: Option<String>,

    /// The frequency of that component [Hz].
    pub reference_frequency: Option<f64>,
}

/// Resolves the comb equation against measured mean values.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    comb: &'a CombDescriptor,

    /// The repetition rate to use [Hz]: a set point or a measured mean.
    rep: f64,

    /// The mean beat note [Hz].
    beat: f64,

    /// Candidates closer to each other than this [Hz] are indistinguishable.
    epsilon: f64,
}

impl<'a> Resolver<'a> {
    pub fn new(
        comb: &'a CombDescriptor,
        rep: f64,
        beat: f64,
        epsilon: f64,
    ) -> Result<Resolver<'a>, ResolveError> {
        if !(rep.is_finite() && rep > 0.0) {
            return Err(ResolveError::InvalidRepRate(rep));
        }
        if !beat.is_finite() {
            return Err(ResolveError::InvalidBeat(beat));
        }
        Ok(Resolver {
            comb,
            rep,
            beat,
            epsilon: epsilon.max(0.0),
        })
    }

    pub fn resolve(&self, spec: &ResolutionSpec) -> Result<Resolution, ResolveError> {
        debug!("Resolving the comb equation ({})", spec.describe());
        let (best, reference_frequency) = match spec {
            ResolutionSpec::Fixed { mode, signs } => {
                if *mode == 0 {
                    return Err(ResolveError::ZeroMode);
                }
                (self.candidate(*mode, *signs, None), None)
            }

            ResolutionSpec::TargetAndSigns { target, signs } => {
                let target = check_target(*target)?;
                let mode = self
                    .implied_mode(target, *signs)
                    .ok_or(ResolveError::NoPositiveMode { target })?;
                (self.candidate(mode, *signs, Some(target)), None)
            }

            ResolutionSpec::TargetAndMode { target, mode } => {
                let target = check_target(*target)?;
                if *mode == 0 {
                    return Err(ResolveError::ZeroMode);
                }
                let candidates = Signs::all()
                    .into_iter()
                    .map(|signs| self.candidate(*mode, signs, Some(target)))
                    .collect();
                let best = unique_best(candidates, |c| c.residual, self.epsilon).map_err(|candidates| {
                    ResolveError::AmbiguousSigns {
                        target,
                        epsilon: self.epsilon,
                        candidates,
                    }
                })?;
                (best, None)
            }

            ResolutionSpec::TargetOnly { target } => (self.target_only(*target)?, None),

            ResolutionSpec::ReferenceTable(table) => {
                let mut candidates = Vec::with_capacity(table.entries().len());
                for entry in table.entries() {
                    let mut c = self.target_only(entry.frequency)?;
                    trace!("Reference component {}: {c}", entry.label);
                    c.label = Some(entry.label.clone());
                    candidates.push((c, entry.frequency));
                }
                let (best, frequency) = unique_best(candidates, |(c, _)| c.residual, self.epsilon)
                    .map_err(|tied| ResolveError::AmbiguousMode {
                        epsilon: self.epsilon,
                        candidates: tied.into_iter().map(|(c, _)| c).collect(),
                    })?;
                (best, Some(frequency))
            }
        };

        debug!("Resolved: {best}");
        Ok(Resolution {
            params: EquationParameters {
                comb: self.comb.clone(),
                mode: best.mode,
                signs: best.signs,
            },
            laser: best.laser,
            residual: spec
                .target()
                .or(reference_frequency)
                .map(|_| best.residual),
            reference_label: best.label,
            reference_frequency,
        })
    }

    /// The mode number that brings the comb equation closest to `target`.
    /// `None` if that is not positive.
    fn implied_mode(&self, target: f64, signs: Signs) -> Option<u64> {
        let n = ((target
            - signs.offset.value() * self.comb.equation_offset()
            - signs.beat.value() * self.beat)
            / self.rep)
            .round();
        if n >= 1.0 {
            Some(n as u64)
        } else {
            None
        }
    }

    fn candidate(&self, mode: u64, signs: Signs, target: Option<f64>) -> Candidate {
        let laser = comb_equation(mode, signs, self.rep, self.beat, self.comb.equation_offset());
        Candidate {
            mode,
            signs,
            laser,
            residual: target.map(|t| (laser - t).abs()).unwrap_or(0.0),
            label: None,
        }
    }

    fn target_only(&self, target: f64) -> Result<Candidate, ResolveError> {
        let target = check_target(target)?;
        let candidates: Vec<Candidate> = Signs::all()
            .into_iter()
            .filter_map(|signs| {
                self.implied_mode(target, signs)
                    .map(|mode| self.candidate(mode, signs, Some(target)))
            })
            .collect();
        if candidates.is_empty() {
            return Err(ResolveError::NoPositiveMode { target });
        }
        for c in &candidates {
            trace!("Candidate: {c}");
        }
        unique_best(candidates, |c| c.residual, self.epsilon).map_err(|candidates| {
            ResolveError::AmbiguousMode {
                epsilon: self.epsilon,
                candidates,
            }
        })
    }
}

/// The item with the smallest residual, or, if others are within `epsilon` of
/// it, all of the tied items.
fn unique_best<T, F: Fn(&T) -> f64>(
    mut items: Vec<T>,
    residual: F,
    epsilon: f64,
) -> Result<T, Vec<T>> {
    items.sort_by(|a, b| residual(a).total_cmp(&residual(b)));
    let best_residual = residual(&items[0]);
    let num_tied = items
        .iter()
        .take_while(|i| residual(i) - best_residual <= epsilon)
        .count();
    if num_tied > 1 {
        items.truncate(num_tied);
        Err(items)
    } else {
        Ok(items.swap_remove(0))
    }
}

fn check_target(target: f64) -> Result<f64, ResolveError> {
    if target.is_finite() && target > 0.0 {
        Ok(target)
    } else {
        Err(ResolveError::InvalidTarget(target))
    }
}
