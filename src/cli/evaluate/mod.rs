// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

use super::common::{
    display_warnings, InfoPrinter, Warn, ARG_FILE_HELP, AUX_QUANTITY_HELP, COMB_TYPE_HELP,
    CYCLE_SLIP_TOLERANCE_HELP, EPSILON_HELP, FOFF_TOLERANCE_HELP, FREP_TOLERANCE_HELP,
    VARIANT_HELP,
};
use crate::{
    comb::{CombDescriptor, CombType, InvalidSign, Sign},
    constants::{
        AUX_OUTPUT_EXTENSION, DEFAULT_CYCLE_SLIP_TOLERANCE, DEFAULT_FOFF_TOLERANCE,
        DEFAULT_FREP_TOLERANCE, DEFAULT_RESOLUTION_EPSILON, IDENTITY_CALIBRATION,
        INPUT_EXTENSION, MAIN_OUTPUT_EXTENSION,
    },
    filter::FilterCriteria,
    hardware::HardwareVariant,
    io::{
        read::load,
        write::{can_write_to_file, FileWriteError},
    },
    params::{EvaluateParams, OutputParams},
    reference::{ReferenceEntry, ReferenceTable},
    resolve::{ResolutionInputs, ResolutionSpec},
    synthesize::{AuxQuantity, RepRateSource, SynthesisOptions, TimeAxis},
    CombCalError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct EvaluateArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// Path to the counter log. If it has no extension and doesn't exist,
    /// ".dat" is appended.
    #[clap(short, long, parse(from_os_str), help_heading = "INPUT FILE")]
    pub(super) input: Option<PathBuf>,

    #[clap(long, help = VARIANT_HELP.as_str(), help_heading = "COUNTERS")]
    pub(super) variant: Option<String>,

    /// The calibration polynomial of the auxiliary channel (counter 3),
    /// lowest order first. Default: 0 1 (readings are used as they are).
    #[clap(
        long,
        multiple_values(true),
        allow_hyphen_values(true),
        help_heading = "COUNTERS"
    )]
    pub(super) aux_calibration: Option<Vec<f64>>,

    #[clap(short, long, help = COMB_TYPE_HELP.as_str(), help_heading = "COMB")]
    pub(super) comb_type: Option<String>,

    /// Override the comb's fundamental offset frequency [Hz].
    #[clap(long, help_heading = "COMB")]
    pub(super) offset_freq: Option<f64>,

    /// The repetition-rate set point [Hz]. It is used for filtering, for
    /// resolving the comb equation and as the fixed repetition rate. 0 means
    /// there is no set point. Default: filter on the mean of the repetition
    /// rate counter, and use the mean of the valid samples elsewhere.
    #[clap(long, help_heading = "OUTLIER FILTER")]
    pub(super) frep: Option<f64>,

    #[clap(long, help = FREP_TOLERANCE_HELP.as_str(), help_heading = "OUTLIER FILTER")]
    pub(super) frep_tolerance: Option<f64>,

    #[clap(long, help = FOFF_TOLERANCE_HELP.as_str(), help_heading = "OUTLIER FILTER")]
    pub(super) foff_tolerance: Option<f64>,

    #[clap(long, help = CYCLE_SLIP_TOLERANCE_HELP.as_str(), help_heading = "OUTLIER FILTER")]
    pub(super) cycle_slip_tolerance: Option<f64>,

    /// The beat frequency that cycle slips are detected against [Hz].
    /// Default: the median of the beat counter.
    #[clap(long, help_heading = "OUTLIER FILTER")]
    pub(super) beat_setpoint: Option<f64>,

    /// Don't remove any outliers.
    #[clap(long, help_heading = "OUTLIER FILTER")]
    #[serde(default)]
    pub(super) no_filter: bool,

    /// The expected laser frequency [Hz].
    #[clap(short, long, help_heading = "COMB EQUATION")]
    pub(super) target: Option<f64>,

    /// The mode number of the comb tooth the laser beats with.
    #[clap(short = 'n', long, help_heading = "COMB EQUATION")]
    pub(super) mode: Option<u64>,

    /// The sign of the beat frequency in the comb equation (+ or -).
    #[clap(long, allow_hyphen_values(true), help_heading = "COMB EQUATION")]
    pub(super) beat_sign: Option<String>,

    /// The sign of the offset frequency in the comb equation (+ or -).
    #[clap(long, allow_hyphen_values(true), help_heading = "COMB EQUATION")]
    pub(super) offset_sign: Option<String>,

    /// Find the laser frequency by matching against a reference table. The
    /// default table holds the d, e, f and g hyperfine components of the
    /// iodine-stabilised 633 nm He-Ne laser; an argument file may supply its
    /// own as "reference_components".
    #[clap(long, help_heading = "COMB EQUATION")]
    #[serde(default)]
    pub(super) reference_table: bool,

    /// Reference components; only settable with an argument file.
    #[clap(skip)]
    pub(super) reference_components: Option<Vec<ReferenceEntry>>,

    #[clap(long, help = EPSILON_HELP.as_str(), help_heading = "COMB EQUATION")]
    pub(super) epsilon: Option<f64>,

    /// Evaluate every sample with the fixed repetition rate rather than its
    /// own reading.
    #[clap(long, help_heading = "RESULTS")]
    #[serde(default)]
    pub(super) fixed_rep_rate: bool,

    #[clap(long, help = AUX_QUANTITY_HELP.as_str(), help_heading = "RESULTS")]
    pub(super) aux_quantity: Option<String>,

    /// Use the MJD rather than the elapsed time in the auxiliary file.
    #[clap(long, help_heading = "RESULTS")]
    #[serde(default)]
    pub(super) mjd: bool,

    /// Path to the main output file. Default: the input with a ".prn"
    /// extension.
    #[clap(short, long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,

    /// Path to the auxiliary output file. Default: the input with a ".txt"
    /// extension.
    #[clap(long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub(super) aux: Option<PathBuf>,

    /// Don't write the auxiliary output file.
    #[clap(long, help_heading = "OUTPUT FILES")]
    #[serde(default)]
    pub(super) no_aux: bool,

    /// Don't write a header into the main output file.
    #[clap(long, help_heading = "OUTPUT FILES")]
    #[serde(default)]
    pub(super) no_header: bool,

    /// A comment for the header of the main output file.
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) comment: Option<String>,

    /// Plot the auxiliary series to this PNG file. Only available if compiled
    /// with the "plotting" feature.
    #[clap(long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub(super) plot: Option<PathBuf>,
}

impl EvaluateArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<EvaluateArgs, CombCalError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let EvaluateArgs {
                args_file: _,
                input,
                variant,
                aux_calibration,
                comb_type,
                offset_freq,
                frep,
                frep_tolerance,
                foff_tolerance,
                cycle_slip_tolerance,
                beat_setpoint,
                no_filter,
                target,
                mode,
                beat_sign,
                offset_sign,
                reference_table,
                reference_components,
                epsilon,
                fixed_rep_rate,
                aux_quantity,
                mjd,
                output,
                aux,
                no_aux,
                no_header,
                comment,
                plot,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(EvaluateArgs {
                args_file: None,
                input: cli_args.input.or(input),
                variant: cli_args.variant.or(variant),
                aux_calibration: cli_args.aux_calibration.or(aux_calibration),
                comb_type: cli_args.comb_type.or(comb_type),
                offset_freq: cli_args.offset_freq.or(offset_freq),
                frep: cli_args.frep.or(frep),
                frep_tolerance: cli_args.frep_tolerance.or(frep_tolerance),
                foff_tolerance: cli_args.foff_tolerance.or(foff_tolerance),
                cycle_slip_tolerance: cli_args.cycle_slip_tolerance.or(cycle_slip_tolerance),
                beat_setpoint: cli_args.beat_setpoint.or(beat_setpoint),
                no_filter: cli_args.no_filter || no_filter,
                target: cli_args.target.or(target),
                mode: cli_args.mode.or(mode),
                beat_sign: cli_args.beat_sign.or(beat_sign),
                offset_sign: cli_args.offset_sign.or(offset_sign),
                reference_table: cli_args.reference_table || reference_table,
                reference_components: cli_args.reference_components.or(reference_components),
                epsilon: cli_args.epsilon.or(epsilon),
                fixed_rep_rate: cli_args.fixed_rep_rate || fixed_rep_rate,
                aux_quantity: cli_args.aux_quantity.or(aux_quantity),
                mjd: cli_args.mjd || mjd,
                output: cli_args.output.or(output),
                aux: cli_args.aux.or(aux),
                no_aux: cli_args.no_aux || no_aux,
                no_header: cli_args.no_header || no_header,
                comment: cli_args.comment.or(comment),
                plot: cli_args.plot.or(plot),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<EvaluateParams, CombCalError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            input,
            variant,
            aux_calibration,
            comb_type,
            offset_freq,
            frep,
            frep_tolerance,
            foff_tolerance,
            cycle_slip_tolerance,
            beat_setpoint,
            no_filter,
            target,
            mode,
            beat_sign,
            offset_sign,
            reference_table,
            reference_components,
            epsilon,
            fixed_rep_rate,
            aux_quantity,
            mjd,
            output,
            aux,
            no_aux,
            no_header,
            comment,
            plot,
        } = self;

        // The counter log.
        let input = match input {
            Some(i) => resolve_input(i),
            None => return Err(EvaluateArgsError::NoInput.into()),
        };
        let series = load(&input)?;
        let mut printer = InfoPrinter::new("Counter log".into());
        printer.push_line(format!("File: {}", input.display()).into());
        printer.push_block(vec![
            format!("{} records", series.len()).into(),
            format!("starting {}", series.start()).into(),
        ]);
        printer.push_line(format!("{} header lines", series.header().len()).into());
        printer.display();

        // The comb.
        let variant = match variant {
            Some(v) => v.parse::<HardwareVariant>()?,
            None => HardwareVariant::A,
        };
        let comb_type = match comb_type {
            Some(c) => CombType::parse(&c)?,
            None => CombType::Generic,
        };
        if let Some(f) = offset_freq {
            if !(f.is_finite() && f > 0.0) {
                return Err(EvaluateArgsError::InvalidOffset(f).into());
            }
        }
        let comb = CombDescriptor::new(comb_type, offset_freq);
        let aux_calibration = aux_calibration.unwrap_or_else(|| IDENTITY_CALIBRATION.to_vec());
        if aux_calibration.is_empty() {
            return Err(EvaluateArgsError::EmptyCalibration.into());
        }
        let mut printer = InfoPrinter::new("Comb".into());
        printer.push_line(comb.name.clone().into());
        printer.push_line(
            format!(
                "Offset frequency: {} Hz (x{} in the comb equation)",
                comb.fundamental_offset, comb.offset_multiplier
            )
            .into(),
        );
        let roles = variant.roles();
        printer.push_line(
            format!(
                "Counters (variant {}): f_rep {}, f_off {}, f_beat {}",
                variant, roles.rep, roles.offset, roles.beat
            )
            .into(),
        );
        printer.display();

        // The outlier filter.
        let rep_setpoint = match frep {
            None => None,
            Some(f) if f == 0.0 => None,
            Some(f) if f.is_finite() && f > 0.0 => Some(f),
            Some(f) => return Err(EvaluateArgsError::InvalidRepSetpoint(f).into()),
        };
        let target_rep = match frep {
            None => Some(series.predicted_rep_rate(variant)),
            Some(_) => rep_setpoint,
        };
        let beat_setpoint = match beat_setpoint {
            Some(b) if b.is_finite() => b,
            Some(b) => return Err(EvaluateArgsError::InvalidBeatSetpoint(b).into()),
            None => series.counter_median(roles.beat),
        };
        let criteria = if no_filter {
            FilterCriteria::none(variant, comb.fundamental_offset)
        } else {
            FilterCriteria {
                variant,
                target_rep,
                rep_tolerance: tolerance(frep_tolerance, DEFAULT_FREP_TOLERANCE),
                target_offset: comb.fundamental_offset,
                offset_tolerance: tolerance(foff_tolerance, DEFAULT_FOFF_TOLERANCE),
                target_beat: Some(beat_setpoint),
                cycle_slip_tolerance: tolerance(cycle_slip_tolerance, DEFAULT_CYCLE_SLIP_TOLERANCE),
            }
        };
        let mut printer = InfoPrinter::new("Outlier filter".into());
        if no_filter {
            printer.push_line("Off".into());
        } else {
            let describe = |name: &str, target: Option<f64>, tolerance: Option<f64>| {
                match (target, tolerance) {
                    (Some(t), Some(tol)) => format!("{name}: {t:.3} Hz +- {tol} Hz"),
                    _ => format!("{name}: not checked"),
                }
            };
            printer.push_block(vec![
                describe("f_rep", criteria.target_rep, criteria.rep_tolerance).into(),
                describe(
                    "f_off",
                    Some(criteria.target_offset),
                    criteria.offset_tolerance,
                )
                .into(),
                describe(
                    "f_beat",
                    criteria.target_beat,
                    criteria.cycle_slip_tolerance,
                )
                .into(),
            ]);
        }
        printer.display();

        // The comb equation.
        let parse_sign = |s: Option<String>| -> Result<Option<Sign>, EvaluateArgsError> {
            s.map(|s| s.parse::<Sign>().map_err(EvaluateArgsError::BadSign))
                .transpose()
        };
        let reference_table = match (reference_table, reference_components) {
            (true, Some(entries)) => Some(ReferenceTable::new(entries)?),
            (true, None) => Some(ReferenceTable::iodine_633()),
            (false, Some(_)) => {
                "Reference components were given but the reference table isn't used".warn();
                None
            }
            (false, None) => None,
        };
        let inputs = ResolutionInputs {
            target,
            mode,
            beat_sign: parse_sign(beat_sign)?,
            offset_sign: parse_sign(offset_sign)?,
            reference_table,
        };
        for note in inputs.notes() {
            note.warn();
        }
        let spec = inputs.into_spec()?;
        let epsilon = match epsilon {
            None => DEFAULT_RESOLUTION_EPSILON,
            Some(e) if e.is_finite() && e >= 0.0 => e,
            Some(e) => return Err(EvaluateArgsError::InvalidEpsilon(e).into()),
        };
        let mut printer = InfoPrinter::new("Comb equation".into());
        printer.push_line(format!("Resolution: {}", spec.describe()).into());
        if let Some(target) = spec.target() {
            printer.push_line(format!("Target: {target:.3} Hz").into());
        }
        if let ResolutionSpec::ReferenceTable(table) = &spec {
            printer.push_block(
                table
                    .entries()
                    .iter()
                    .map(|e| format!("{}: {:.3} Hz", e.label, e.frequency).into())
                    .collect(),
            );
        }
        printer.push_line(format!("Ties within {epsilon} Hz are ambiguous").into());
        printer.display();

        // The results.
        let aux_quantity = match aux_quantity {
            Some(q) => q
                .parse::<AuxQuantity>()
                .map_err(|_| EvaluateArgsError::UnknownAuxQuantity(q))?,
            None => AuxQuantity::default(),
        };
        let has_target =
            spec.target().is_some() || matches!(spec, ResolutionSpec::ReferenceTable(_));
        let effective_quantity = aux_quantity.effective(has_target);
        if effective_quantity != aux_quantity {
            format!("There is no target frequency; writing {effective_quantity} instead of {aux_quantity} to the auxiliary file").warn();
        }
        let rep_source = if fixed_rep_rate {
            if rep_setpoint.is_none() {
                "No repetition-rate set point was given; the fixed repetition rate is the mean of the valid samples".warn();
            }
            RepRateSource::Fixed
        } else {
            RepRateSource::Measured
        };
        let synthesis = SynthesisOptions {
            rep_source,
            rep_setpoint,
            aux_quantity,
            time_axis: if mjd { TimeAxis::Mjd } else { TimeAxis::Elapsed },
            target: spec.target(),
            aux_calibration,
        };

        // The output files.
        let main = match output {
            Some(o) => o,
            None => derived_output(&input, MAIN_OUTPUT_EXTENSION, "result"),
        };
        let aux = match (no_aux, aux) {
            (true, Some(_)) => {
                "An auxiliary file was given, but --no-aux says not to write it".warn();
                None
            }
            (true, None) => None,
            (false, Some(a)) => Some(a),
            (false, None) => Some(derived_output(&input, AUX_OUTPUT_EXTENSION, "aux")),
        };
        check_plotting(plot.as_deref())?;
        let mut printer = InfoPrinter::new("Output files".into());
        for file in std::iter::once(&main).chain(aux.iter()).chain(plot.iter()) {
            if file == &input {
                return Err(EvaluateArgsError::OutputIsInput(file.clone()).into());
            }
            can_write_to_file(file)?;
            printer.push_line(format!("{}", file.display()).into());
        }
        if no_header {
            printer.push_line("Not writing a header".into());
        }
        printer.display();

        display_warnings();

        Ok(EvaluateParams {
            input,
            series,
            criteria,
            no_filter,
            comb,
            spec,
            rep_setpoint,
            epsilon,
            synthesis,
            outputs: OutputParams {
                main,
                aux,
                plot,
                write_header: !no_header,
                comment,
            },
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), CombCalError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

/// A tolerance from the command line; values <= 0 switch the check off.
fn tolerance(given: Option<f64>, default: f64) -> Option<f64> {
    let t = given.unwrap_or(default);
    if t > 0.0 {
        Some(t)
    } else {
        None
    }
}

#[cfg(feature = "plotting")]
fn check_plotting(_plot: Option<&Path>) -> Result<(), FileWriteError> {
    Ok(())
}

#[cfg(not(feature = "plotting"))]
fn check_plotting(plot: Option<&Path>) -> Result<(), FileWriteError> {
    match plot {
        Some(_) => Err(FileWriteError::NoPlottingFeature),
        None => Ok(()),
    }
}

/// Counter logs are referred to without their extension.
fn resolve_input(input: PathBuf) -> PathBuf {
    if input.extension().is_none() && !input.exists() {
        input.with_extension(INPUT_EXTENSION)
    } else {
        input
    }
}

/// An output file next to `input` with the extension `ext`. If that would be
/// `input` itself, `suffix` is added to the file stem.
fn derived_output(input: &Path, ext: &str, suffix: &str) -> PathBuf {
    let file = input.with_extension(ext);
    if file != input {
        return file;
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_{suffix}.{ext}"))
}

#[derive(Error, Debug)]
pub(super) enum EvaluateArgsError {
    #[error("No counter log was specified")]
    NoInput,

    #[error("The offset frequency must be positive and finite (got {0} Hz)")]
    InvalidOffset(f64),

    #[error("The repetition-rate set point must be positive and finite, or 0 for none (got {0} Hz)")]
    InvalidRepSetpoint(f64),

    #[error("The beat set point must be finite (got {0} Hz)")]
    InvalidBeatSetpoint(f64),

    #[error("The resolution epsilon must be non-negative and finite (got {0} Hz)")]
    InvalidEpsilon(f64),

    #[error(transparent)]
    BadSign(#[from] InvalidSign),

    #[error("Auxiliary quantity '{0}' is unknown. Supported: {}", AuxQuantity::iter().join(", "))]
    UnknownAuxQuantity(String),

    #[error("The auxiliary channel calibration needs at least one coefficient")]
    EmptyCalibration,

    #[error("Output file '{}' is the counter log itself", .0.display())]
    OutputIsInput(PathBuf),
}
