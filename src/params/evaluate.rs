// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    comb::CombDescriptor,
    filter::{FilterCriteria, FilteredSeries},
    io::write::{plot_aux, write_aux, write_main, FileWriteError, ReportContext},
    resolve::{ResolutionSpec, ResolveError, Resolver},
    series::CounterSeries,
    synthesize::{synthesize, SynthesisError, SynthesisOptions},
};

pub(crate) struct OutputParams {
    /// The main output file.
    pub(crate) main: PathBuf,

    /// The auxiliary output file, if one is to be written.
    pub(crate) aux: Option<PathBuf>,

    /// Where to plot the auxiliary series, if anywhere.
    pub(crate) plot: Option<PathBuf>,

    pub(crate) write_header: bool,
    pub(crate) comment: Option<String>,
}

pub(crate) struct EvaluateParams {
    pub(crate) input: PathBuf,
    pub(crate) series: CounterSeries,
    pub(crate) criteria: FilterCriteria,

    /// Whether the operator switched filtering off. `criteria` flags nothing
    /// in this case.
    pub(crate) no_filter: bool,

    pub(crate) comb: CombDescriptor,
    pub(crate) spec: ResolutionSpec,

    /// The operator's repetition-rate set point [Hz], used for resolving the
    /// equation (and by the synthesis if it uses a fixed repetition rate).
    pub(crate) rep_setpoint: Option<f64>,

    /// The tie tolerance when resolving [Hz].
    pub(crate) epsilon: f64,

    pub(crate) synthesis: SynthesisOptions,
    pub(crate) outputs: OutputParams,
}

impl EvaluateParams {
    /// Filter, resolve, synthesize and write out. Nothing is written unless
    /// every stage succeeds.
    pub(crate) fn run(&self) -> Result<(), EvaluateError> {
        let Self {
            input,
            series,
            criteria,
            no_filter,
            comb,
            spec,
            rep_setpoint,
            epsilon,
            synthesis,
            outputs,
        } = self;

        let filtered = FilteredSeries::apply(series, *criteria);
        let counts = filtered.counts();
        info!(
            "{} samples read, {} outliers removed ({:.1}%)",
            counts.raw,
            counts.outliers(),
            counts.outlier_percentage()
        );
        debug!(
            "Outliers by criterion: f_rep {}, f_off {}, cycle slips {}",
            counts.rep, counts.offset, counts.cycle_slip
        );
        // Means over zero samples are meaningless; stop before resolving.
        if counts.valid == 0 {
            return Err(SynthesisError::EmptySeries { counts }.into());
        }

        let resolver_rep = rep_setpoint.unwrap_or_else(|| filtered.mean_rep());
        debug!(
            "Resolving with f_rep = {resolver_rep:.6} Hz, mean f_beat = {:.3} Hz",
            filtered.mean_beat()
        );
        let resolution =
            Resolver::new(comb, resolver_rep, filtered.mean_beat(), *epsilon)?.resolve(spec)?;
        info!(
            "Resolved ({}): mode number {}, {}",
            spec.describe(),
            resolution.params.mode,
            resolution.params.signs
        );
        if let Some(label) = &resolution.reference_label {
            info!("Closest reference component: {label}");
        }

        // A reference table only provides a target once resolved.
        let options = SynthesisOptions {
            target: synthesis
                .target
                .or_else(|| spec.target())
                .or(resolution.reference_frequency),
            ..synthesis.clone()
        };
        let result = synthesize(&filtered, &resolution.params, &options)?;

        let input_str = input.display().to_string();
        let context = ReportContext {
            input: &input_str,
            comment: outputs.comment.as_deref(),
            spec,
            resolution: &resolution,
            filtered: &filtered,
            no_filter: *no_filter,
            result: &result,
        };
        // If any output fails, every output touched so far is removed.
        let mut touched: Vec<&Path> = vec![];
        let write_result = (|| -> Result<(), FileWriteError> {
            touched.push(&outputs.main);
            write_main(
                &outputs.main,
                &result,
                outputs.write_header.then_some(&context),
            )?;
            if let Some(aux) = &outputs.aux {
                touched.push(aux);
                write_aux(aux, &result)?;
            }
            if let Some(plot) = &outputs.plot {
                touched.push(plot);
                let title = format!("{input_str}: {}", result.aux_quantity().description());
                plot_aux(plot, &result, &title)?;
            }
            Ok(())
        })();
        if let Err(e) = write_result {
            for file in touched.into_iter().filter(|f| f.exists()) {
                debug!("Removing {} after a failed write", file.display());
                if let Err(rm_err) = std::fs::remove_file(file) {
                    warn!("Couldn't remove {}: {rm_err}", file.display());
                }
            }
            return Err(e.into());
        }
        for file in [Some(&outputs.main), outputs.aux.as_ref(), outputs.plot.as_ref()]
            .into_iter()
            .flatten()
        {
            info!("Wrote {}", file.display());
        }

        let laser = result.statistics().laser;
        info!(
            "Laser frequency: {:.3} Hz (std. dev. {:.3} Hz, span {:.3} Hz)",
            laser.mean, laser.std_dev, laser.span
        );
        Ok(())
    }
}

#[derive(Error, Debug)]
pub(crate) enum EvaluateError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    FileWrite(#[from] FileWriteError),
}
