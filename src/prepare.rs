use thiserror::Error;

use crate::data::model::{ColumnKind, WellLogDataset};

pub const PLOT_TITLE: &str = "Plot of Selected Features vs Depth";
pub const X_AXIS_TITLE: &str = "Selected Features (Scaled)";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum PrepareError {
    #[error("No data loaded.")]
    NoDataset,

    #[error("Please select at least one feature for the X-axis.")]
    NoFeaturesSelected,

    #[error("Unknown feature column '{0}'.")]
    UnknownFeatureColumn(String),

    #[error("'{0}' column not found in dataset.")]
    UnknownDepthColumn(String),

    #[error("Column '{0}' is not numeric and cannot be plotted.")]
    NonNumericColumn(String),

    #[error("No rows left to plot after cleaning.")]
    EmptyDataset,
}

// ---------------------------------------------------------------------------
// PlotSpec – everything a chart needs, nothing about how it is drawn
// ---------------------------------------------------------------------------

/// One plotted feature: scaled x-values against the shared depth values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSeries {
    pub label: String,
    /// Feature values, all inside [0, 1].
    pub x_values: Vec<f64>,
    /// Depth values, unscaled, aligned with `x_values`.
    pub y_values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub series: Vec<FeatureSeries>,
    /// `(max depth, min depth)`: the axis runs deep-to-shallow bottom-up,
    /// so shallow depth renders at the top.
    pub y_axis_bounds: (f64, f64),
    /// Whether min-max scaling was applied.
    pub scaled: bool,
}

// ---------------------------------------------------------------------------
// Preparation
// ---------------------------------------------------------------------------

/// Turn a feature selection into plot-ready series.
///
/// Duplicate names are collapsed, then the selection is cut to the first
/// `max_features` entries. If every kept feature already lies in [0, 1]
/// the raw values are used; otherwise each is min-max scaled on its own.
pub fn prepare<S: AsRef<str>>(
    dataset: &WellLogDataset,
    depth_column: &str,
    selected: &[S],
    max_features: usize,
) -> Result<PlotSpec, PrepareError> {
    let mut features: Vec<&str> = Vec::with_capacity(selected.len());
    for name in selected {
        let name = name.as_ref();
        if !features.contains(&name) {
            features.push(name);
        }
    }
    if features.is_empty() {
        return Err(PrepareError::NoFeaturesSelected);
    }
    if features.len() > max_features {
        log::warn!(
            "{} features selected, plotting only the first {max_features}",
            features.len()
        );
        features.truncate(max_features);
    }

    let depth = plottable_column(dataset, depth_column, PrepareError::UnknownDepthColumn)?;

    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(features.len());
    for &name in &features {
        if name == depth_column {
            return Err(PrepareError::UnknownFeatureColumn(name.to_string()));
        }
        columns.push(plottable_column(
            dataset,
            name,
            PrepareError::UnknownFeatureColumn,
        )?);
    }

    if dataset.is_empty() {
        return Err(PrepareError::EmptyDataset);
    }
    let (depth_min, depth_max) = min_max(&depth).ok_or(PrepareError::EmptyDataset)?;

    let scaled = !columns.iter().all(|c| within_unit_range(c));
    if scaled {
        columns = columns.iter().map(|c| min_max_scale(c)).collect();
    }
    log::debug!(
        "Prepared {} series over {} rows (scaled: {scaled})",
        features.len(),
        depth.len()
    );

    let series = features
        .iter()
        .zip(columns)
        .map(|(name, x_values)| FeatureSeries {
            label: name.to_string(),
            x_values,
            y_values: depth.clone(),
        })
        .collect();

    Ok(PlotSpec {
        title: PLOT_TITLE.to_string(),
        x_axis_title: X_AXIS_TITLE.to_string(),
        y_axis_title: depth_column.to_string(),
        series,
        y_axis_bounds: (depth_max, depth_min),
        scaled,
    })
}

fn plottable_column(
    dataset: &WellLogDataset,
    name: &str,
    unknown: fn(String) -> PrepareError,
) -> Result<Vec<f64>, PrepareError> {
    let not_numeric = || PrepareError::NonNumericColumn(name.to_string());
    match dataset.kind_of(name) {
        None => Err(unknown(name.to_string())),
        Some(ColumnKind::Other) => Err(not_numeric()),
        Some(ColumnKind::Numeric) => dataset.numeric_column(name).ok_or_else(not_numeric),
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    Some((min, max))
}

/// Whether every value lies in [0, 1] inclusive.
pub fn within_unit_range(values: &[f64]) -> bool {
    min_max(values).is_some_and(|(min, max)| min >= 0.0 && max <= 1.0)
}

/// Linear rescale so the column minimum maps to 0 and the maximum to 1.
/// A constant column maps to all zeros.
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let Some((min, max)) = min_max(values) else {
        return Vec::new();
    };
    let range = max - min;
    if range == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|&v| (v - min) / range).collect()
}
