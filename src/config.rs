use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Constants driving loading and plotting. Defaults match the usual
/// well-log conventions (LAS null value, `DEPTH` reference column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column every feature is plotted against.
    pub depth_column: String,
    /// Numeric code meaning "no reading".
    pub missing_sentinel: f64,
    /// Lower quantile of the per-column outlier trim.
    pub lower_quantile: f64,
    /// Upper quantile of the per-column outlier trim.
    pub upper_quantile: f64,
    /// Maximum number of features drawn in one plot.
    pub max_features: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            depth_column: "DEPTH".to_string(),
            missing_sentinel: -999.25,
            lower_quantile: 0.05,
            upper_quantile: 0.98,
            max_features: 7,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file. Absent keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&text).context("parsing config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.depth_column.trim().is_empty(),
            "depth_column must not be empty"
        );
        ensure!(
            (0.0..=1.0).contains(&self.lower_quantile)
                && (0.0..=1.0).contains(&self.upper_quantile)
                && self.lower_quantile <= self.upper_quantile,
            "quantiles must satisfy 0 <= lower ({}) <= upper ({}) <= 1",
            self.lower_quantile,
            self.upper_quantile
        );
        ensure!(self.max_features > 0, "max_features must be at least 1");
        Ok(())
    }
}
