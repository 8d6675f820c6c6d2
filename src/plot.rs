//! SVG charts of the grid-search surface

use crate::core::{Result, SVMError};
use crate::model_selection::GridSearchResult;
use log::info;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::path::Path;

type DrawResult = std::result::Result<(), Box<dyn Error>>;

/// Heatmap of mean CV accuracy, one row per C and one column per gamma
///
/// Cells use a black-red-yellow-white ramp scaled to the observed score range
/// and carry the score to three decimals.
pub fn plot_heatmap<P: AsRef<Path>>(path: P, result: &GridSearchResult) -> Result<()> {
    let path = path.as_ref();
    draw_heatmap(path, result).map_err(|e| SVMError::PlotError(e.to_string()))?;
    info!("Wrote heatmap to {}", path.display());
    Ok(())
}

/// Accuracy against C on a logarithmic axis, one line per gamma
pub fn plot_accuracy_vs_c<P: AsRef<Path>>(path: P, result: &GridSearchResult) -> Result<()> {
    let path = path.as_ref();
    draw_accuracy_vs_c(path, result).map_err(|e| SVMError::PlotError(e.to_string()))?;
    info!("Wrote accuracy plot to {}", path.display());
    Ok(())
}

fn draw_heatmap(path: &Path, result: &GridSearchResult) -> DrawResult {
    let matrix = result.score_matrix();
    let n_c = result.c_values.len() as i32;
    let n_gamma = result.gamma_values.len() as i32;
    if n_c == 0 || n_gamma == 0 {
        return Err("grid search result has no entries".into());
    }

    let (lo, hi) = matrix
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = hi - lo;

    let root = SVGBackend::new(path, (1200, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Accuracy for different parameters", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n_gamma).into_segmented(), (0..n_c).into_segmented())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("gamma")
        .y_desc("C")
        .x_labels(n_gamma as usize)
        .y_labels(n_c as usize)
        .x_label_formatter(&|v| segment_label(v, &result.gamma_values))
        .y_label_formatter(&|v| segment_label(v, &result.c_values))
        .draw()?;

    for (i, row) in matrix.iter().enumerate() {
        for (j, &score) in row.iter().enumerate() {
            let (x, y) = (j as i32, i as i32);
            let t = if span < 1e-12 { 1.0 } else { (score - lo) / span };

            chart.draw_series(std::iter::once(Rectangle::new(
                [
                    (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                ],
                hot(t).filled(),
            )))?;

            let text_color = if t < 0.5 { WHITE } else { BLACK };
            let style = ("sans-serif", 12)
                .into_font()
                .color(&text_color)
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart.draw_series(std::iter::once(Text::new(
                format!("{score:.3}"),
                (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                style,
            )))?;
        }
    }

    root.present()?;
    Ok(())
}

fn draw_accuracy_vs_c(path: &Path, result: &GridSearchResult) -> DrawResult {
    let c_min = result.c_values.iter().copied().fold(f64::INFINITY, f64::min);
    let c_max = result
        .c_values
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    if !(c_min > 0.0 && c_max.is_finite()) {
        return Err("C values must be positive to use a logarithmic axis".into());
    }

    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Accuracy vs C parameter", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((c_min / 2.0..c_max * 2.0).log_scale(), 0.0f64..1.05)?;

    chart
        .configure_mesh()
        .x_desc("C")
        .y_desc("Accuracy")
        .x_label_formatter(&|c| format!("{c:e}"))
        .draw()?;

    for (j, gamma) in result.gamma_values.iter().enumerate() {
        let rgba = Palette99::pick(j).to_rgba();
        let color = RGBColor(rgba.0, rgba.1, rgba.2);
        let points: Vec<(f64, f64)> = result
            .c_values
            .iter()
            .copied()
            .zip(result.scores_for_gamma(j))
            .collect();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(format!("gamma={gamma:e}"))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, 3, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn segment_label(value: &SegmentValue<i32>, params: &[f64]) -> String {
    match value {
        SegmentValue::Exact(idx) | SegmentValue::CenterOf(idx) => usize::try_from(*idx)
            .ok()
            .and_then(|i| params.get(i))
            .map(|p| format!("{p:e}"))
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

/// Black to red to yellow to white, `t` in [0, 1]
fn hot(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let channel =
        |start: f64, width: f64| (((t - start) / width).clamp(0.0, 1.0) * 255.0).round() as u8;
    RGBColor(channel(0.0, 0.365), channel(0.365, 0.375), channel(0.74, 0.26))
}
