// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Summarise a counter log without evaluating it.

use std::path::{Path, PathBuf};

use clap::Parser;
use log::debug;

use super::common::{InfoPrinter, VARIANT_HELP};
use crate::{
    constants::{AUX_COUNTER, NUM_COUNTERS},
    hardware::HardwareVariant,
    io::read::load,
    series::CounterSeries,
    CombCalError,
};

#[derive(Parser, Debug)]
pub(super) struct CountersArgs {
    /// Path to the counter log.
    #[clap(name = "INPUT", parse(from_os_str))]
    input: PathBuf,

    #[clap(long, help = VARIANT_HELP.as_str())]
    variant: Option<String>,
}

impl CountersArgs {
    pub(super) fn run(self) -> Result<(), CombCalError> {
        debug!("{:#?}", self);
        let variant = match self.variant {
            Some(v) => v.parse::<HardwareVariant>()?,
            None => HardwareVariant::A,
        };
        let series = load(&self.input)?;
        for printer in summarise(&self.input, &series, variant) {
            printer.display();
        }
        Ok(())
    }
}

fn summarise(input: &Path, series: &CounterSeries, variant: HardwareVariant) -> [InfoPrinter; 2] {
    let mut file_printer = InfoPrinter::new(format!("{}", input.display()).into());
    file_printer.push_block(vec![
        format!("{} records", series.len()).into(),
        format!("starting {}", series.start()).into(),
    ]);
    if let Some(last) = series.samples().last() {
        file_printer.push_line(format!("Spanning {:.3} s", last.elapsed).into());
    }
    file_printer.push_block(
        series
            .header()
            .iter()
            .map(|h| format!("> {h}").into())
            .collect(),
    );

    let roles = variant.roles();
    let mut counter_printer = InfoPrinter::new(format!("Counters (variant {variant})").into());
    counter_printer.push_block(
        (0..NUM_COUNTERS)
            .map(|i| {
                let role = match i {
                    i if i == roles.rep => " (f_rep)",
                    i if i == roles.offset => " (f_off)",
                    i if i == roles.beat => " (f_beat)",
                    AUX_COUNTER => " (auxiliary)",
                    _ => "",
                };
                format!(
                    "{i}: mean {:.3}, median {:.3}{role}",
                    series.counter_mean(i),
                    series.counter_median(i)
                )
                .into()
            })
            .collect(),
    );
    counter_printer.push_line(
        format!(
            "Predicted f_rep: {:.6} Hz",
            series.predicted_rep_rate(variant)
        )
        .into(),
    );

    [file_printer, counter_printer]
}
