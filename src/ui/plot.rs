use std::ops::RangeInclusive;

use eframe::egui::Ui;
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoint, PlotPoints};

use crate::color::feature_color;
use crate::prepare::PlotSpec;
use crate::session::Session;

// ---------------------------------------------------------------------------
// Depth plot (central panel)
// ---------------------------------------------------------------------------

/// Render the prepared plot in the central panel.
///
/// egui_plot has no inverted axis, so depth is drawn negated and the tick
/// and hover labels flip the sign back.
pub fn depth_plot(ui: &mut Ui, session: &Session) {
    let Some(spec) = session.plot() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            let hint = if session.dataset().is_some() {
                "Select features, then press Plot Graph"
            } else {
                "Open a file to view well logs  (File → Open…)"
            };
            ui.heading(hint);
        });
        return;
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&spec.title);
    });

    let (deepest, shallowest) = spec.y_axis_bounds;
    let depth_title = spec.y_axis_title.clone();

    Plot::new("depth_plot")
        .legend(Legend::default())
        .x_axis_label(&spec.x_axis_title)
        .y_axis_label(&spec.y_axis_title)
        .include_x(0.0)
        .include_x(1.0)
        .include_y(-deepest)
        .include_y(-shallowest)
        .y_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            format_depth(-mark.value, mark.step_size)
        })
        .label_formatter(move |name: &str, value: &PlotPoint| {
            let depth = format_depth(-value.y, HOVER_DEPTH_STEP);
            if name.is_empty() {
                format!("{depth_title}: {depth}")
            } else {
                format!("{name}\nx: {:.3}\n{depth_title}: {depth}", value.x)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for line in feature_lines(spec) {
                plot_ui.line(line);
            }
        });
}

fn feature_lines(spec: &PlotSpec) -> Vec<Line<'_>> {
    let count = spec.series.len();
    spec.series
        .iter()
        .enumerate()
        .map(|(i, series)| {
            let points: PlotPoints = series
                .x_values
                .iter()
                .zip(series.y_values.iter())
                .map(|(&x, &depth)| [x, -depth])
                .collect();
            Line::new(points)
                .name(&series.label)
                .color(feature_color(i, count))
                .width(1.5)
        })
        .collect()
}

/// Hover labels show depth to the centimetre.
const HOVER_DEPTH_STEP: f64 = 0.01;

/// Format a depth with as many decimals as `step` needs, so grid marks
/// built as `i * step` don't print float noise.
fn format_depth(depth: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step.is_finite() {
        (-step.log10() - 1e-9).ceil().max(0.0) as usize
    } else {
        0
    };
    // Negating zero yields -0.0, which would print as "-0".
    let depth = if depth == 0.0 { 0.0 } else { depth };
    format!("{depth:.decimals$}")
}
