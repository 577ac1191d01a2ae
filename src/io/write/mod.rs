// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to write out results.
//!
//! The main output file has an optional header followed by the
//! [`OUTPUT_SEPARATOR`] line, then one line per valid sample with the elapsed
//! time, f_rep, f_off, f_beat and the laser frequency. The auxiliary output
//! file has two columns: time (or MJD) and the selected quantity.

mod error;
#[cfg(feature = "plotting")]
mod plot;

pub use error::FileWriteError;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::{debug, trace};

use crate::{
    cli::Warn,
    constants::OUTPUT_SEPARATOR,
    filter::FilteredSeries,
    resolve::{Resolution, ResolutionSpec},
    synthesize::{ResultSeries, TimeAxis},
};

/// Everything that goes into the header of a main output file.
pub struct ReportContext<'a> {
    /// The name of the input file.
    pub input: &'a str,

    pub comment: Option<&'a str>,
    pub spec: &'a ResolutionSpec,
    pub resolution: &'a Resolution,
    pub filtered: &'a FilteredSeries<'a>,

    /// Whether filtering was switched off.
    pub no_filter: bool,
    pub result: &'a ResultSeries,
}

/// Write the main output file. The header is left out if `context` is `None`.
pub fn write_main(
    file: &Path,
    result: &ResultSeries,
    context: Option<&ReportContext>,
) -> Result<(), FileWriteError> {
    debug!("Writing main output to {}", file.display());
    let mut out = BufWriter::new(File::create(file)?);

    if let Some(context) = context {
        for line in header_lines(context) {
            writeln!(out, "{line}")?;
        }
        writeln!(out, "{OUTPUT_SEPARATOR}")?;
    }

    for s in result.samples() {
        writeln!(
            out,
            "{:.3} {:.3} {:.3} {:.3} {:.3}",
            s.elapsed, s.rep, s.offset, s.beat, s.laser
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Write the auxiliary output file.
pub fn write_aux(file: &Path, result: &ResultSeries) -> Result<(), FileWriteError> {
    debug!("Writing auxiliary output to {}", file.display());
    let mut out = BufWriter::new(File::create(file)?);
    for a in result.aux() {
        match result.time_axis() {
            TimeAxis::Elapsed => writeln!(out, "{:.3} {:.3}", a.time, a.value)?,
            TimeAxis::Mjd => writeln!(out, "{:.8} {:.3}", a.time, a.value)?,
        }
    }
    out.flush()?;
    Ok(())
}

/// Plot the auxiliary series to a PNG file.
#[cfg(feature = "plotting")]
pub fn plot_aux(file: &Path, result: &ResultSeries, title: &str) -> Result<(), FileWriteError> {
    plot::plot_aux(file, result, title)
}

/// Plotting is an optional feature; without it, asking for a plot is an
/// error.
#[cfg(not(feature = "plotting"))]
pub fn plot_aux(_file: &Path, _result: &ResultSeries, _title: &str) -> Result<(), FileWriteError> {
    Err(FileWriteError::NoPlottingFeature)
}

/// The header lines of a main output file.
pub(crate) fn header_lines(context: &ReportContext) -> Vec<String> {
    let ReportContext {
        input,
        comment,
        spec,
        resolution,
        filtered,
        no_filter,
        result,
    } = context;
    let params = &resolution.params;
    let series = filtered.series();
    let mut lines = vec![];

    lines.push(format!(
        "{} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
    lines.push(format!("Input file: {input}"));
    lines.push(format!("Start (Unix seconds): {:.3}", series.start().to_unix_seconds()));
    for h in series.header() {
        lines.push(format!("> {h}"));
    }
    if let Some(c) = comment {
        lines.push(format!("Comment: {c}"));
    }
    lines.push(String::new());

    lines.push(format!("Comb: {}", params.comb.name));
    lines.push(format!(
        "Offset frequency: {:.3} Hz (x{} in the comb equation)",
        params.comb.fundamental_offset, params.comb.offset_multiplier
    ));
    lines.push(format!("Counters: variant {}", filtered.variant()));
    lines.push(format!("Resolution: {}", spec.describe()));
    if let Some(target) = spec.target() {
        lines.push(format!("Target frequency: {target:.3} Hz"));
    }
    if let (Some(label), Some(freq)) = (&resolution.reference_label, resolution.reference_frequency)
    {
        lines.push(format!("Reference component: {label} ({freq:.3} Hz)"));
    }
    lines.push(format!("Mode number: {}", params.mode));
    lines.push(format!("Beat sign: {}", params.signs.beat));
    lines.push(format!("Offset sign: {}", params.signs.offset));
    lines.push(format!(
        "Repetition rate: {} (fixed value {:.6} Hz)",
        result.rep_source(),
        result.fixed_rep()
    ));
    lines.push(String::new());

    let criteria = filtered.criteria();
    let counts = filtered.counts();
    if *no_filter {
        lines.push("Filtering: off".to_string());
    } else {
        let describe = |target: Option<f64>, tolerance: Option<f64>| match (target, tolerance) {
            (Some(t), Some(tol)) => format!("{t:.3} Hz +- {tol} Hz"),
            _ => "off".to_string(),
        };
        lines.push(format!(
            "Filter f_rep: {}",
            describe(criteria.target_rep, criteria.rep_tolerance)
        ));
        lines.push(format!(
            "Filter f_off: {}",
            describe(Some(criteria.target_offset), criteria.offset_tolerance)
        ));
        lines.push(format!(
            "Filter cycle slips: {}",
            describe(criteria.target_beat, criteria.cycle_slip_tolerance)
        ));
    }
    lines.push(format!("Raw samples: {}", counts.raw));
    lines.push(format!("Valid samples: {}", counts.valid));
    lines.push(format!(
        "Outliers: {} ({:.2}%; f_rep {}, f_off {}, cycle slips {})",
        counts.outliers(),
        counts.outlier_percentage(),
        counts.rep,
        counts.offset,
        counts.cycle_slip
    ));
    lines.push(String::new());

    lines.push(format!(
        "{:<20} {:>24} {:>16} {:>16}",
        "quantity", "mean", "std. dev.", "span"
    ));
    for (quantity, stats) in result.statistics().rows() {
        lines.push(format!(
            "{:<20} {:>24.3} {:>16.3} {:>16.3}",
            quantity.to_string(),
            stats.mean,
            stats.std_dev,
            stats.span
        ));
    }
    lines.push(String::new());

    lines.push("Columns:".to_string());
    lines.push("1 time since start / s".to_string());
    lines.push("2 repetition rate / Hz".to_string());
    lines.push("3 offset frequency / Hz".to_string());
    lines.push("4 beat frequency / Hz".to_string());
    lines.push("5 laser frequency / Hz".to_string());
    lines
}

/// Test whether a file can be written to. The file may or may not exist; if
/// it does, a warning is raised that it will be overwritten, but the file
/// itself is not touched.
///
/// With this approach, we avoid doing all of the processing only to be unable
/// to write to a file at the end.
pub(crate) fn can_write_to_file(file: &Path) -> Result<(), FileWriteError> {
    trace!("Testing whether we can write to {}", file.display());

    if file.is_dir() {
        return Err(FileWriteError::IsADirectory(file.to_path_buf()));
    }
    let exists = can_write_to_file_inner(file)?;
    if exists {
        format!("Will overwrite the existing file '{}'", file.display()).warn();
    }

    Ok(())
}

fn can_write_to_file_inner(file: &Path) -> Result<bool, FileWriteError> {
    let file_exists = file.exists();

    match std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(file)
        .map_err(|e| e.kind())
    {
        // File is writable.
        Ok(_) => {
            // If the file in question didn't already exist, `OpenOptions::new`
            // creates it as part of its work. We don't want to keep the 0-sized
            // file; remove it if it didn't exist before.
            if !file_exists {
                std::fs::remove_file(file).map_err(FileWriteError::IO)?;
            }
        }

        // The directory leading up to the file doesn't exist. Attempt to make
        // it; if this fails, then we can't write the file anyway.
        Err(std::io::ErrorKind::NotFound) => {
            if let Some(p) = file.parent() {
                match std::fs::DirBuilder::new()
                    .recursive(true)
                    .create(p)
                    .map_err(|e| e.kind())
                {
                    Ok(()) => (),
                    Err(std::io::ErrorKind::PermissionDenied) => {
                        return Err(FileWriteError::NewDirectory(p.to_path_buf()))
                    }
                    Err(e) => return Err(FileWriteError::IO(e.into())),
                }
            }
        }

        Err(std::io::ErrorKind::PermissionDenied) => {
            return Err(FileWriteError::FileNotWritable {
                file: file.display().to_string(),
            })
        }

        Err(e) => {
            return Err(FileWriteError::IO(e.into()));
        }
    }

    Ok(file_exists)
}
