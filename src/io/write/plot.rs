// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Plot the auxiliary series.

use std::path::Path;

use log::debug;
use plotters::prelude::*;

use super::FileWriteError;
use crate::synthesize::ResultSeries;

/// The number of X pixels on the plot.
const X_PIXELS: u32 = 1600;
/// The number of Y pixels on the plot.
const Y_PIXELS: u32 = 900;

pub(super) fn plot_aux(
    file: &Path,
    result: &ResultSeries,
    title: &str,
) -> Result<(), FileWriteError> {
    debug!("Plotting the auxiliary series to {}", file.display());
    let points: Vec<(f64, f64)> = result.aux().iter().map(|a| (a.time, a.value)).collect();

    let (x_min, x_max) = range(points.iter().map(|p| p.0));
    // Plot values relative to their mean; absolute laser frequencies don't
    // fit in axis labels.
    let y_offset = crate::math::mean(points.iter().map(|p| p.1));
    let (y_min, y_max) = range(points.iter().map(|p| p.1 - y_offset));

    let root = BitMapBackend::new(file, (X_PIXELS, Y_PIXELS)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| FileWriteError::Plot(e.to_string()))?;

    let mut cc = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 36))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(110)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| FileWriteError::Plot(e.to_string()))?;

    cc.configure_mesh()
        .x_desc(result.time_axis().description())
        .y_desc(format!(
            "{} - {y_offset:.3}",
            result.aux_quantity().description()
        ))
        .light_line_style(WHITE)
        .draw()
        .map_err(|e| FileWriteError::Plot(e.to_string()))?;

    cc.draw_series(LineSeries::new(
        points.iter().map(|&(x, y)| (x, y - y_offset)),
        &BLUE,
    ))
    .map_err(|e| FileWriteError::Plot(e.to_string()))?;

    root.present()
        .map_err(|e| FileWriteError::Plot(e.to_string()))?;
    Ok(())
}

/// The min and max of `values`, widened if they are the same.
fn range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
        (min.min(v), max.max(v))
    });
    if max > min {
        (min, max)
    } else {
        (min - 1.0, max + 1.0)
    }
}
