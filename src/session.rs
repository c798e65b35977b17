use std::path::Path;

use crate::config::PipelineConfig;
use crate::data::loader::{self, LoadError};
use crate::data::model::WellLogDataset;
use crate::prepare::{self, PlotSpec, PrepareError};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything one viewing session owns, independent of rendering.
pub struct Session {
    pub config: PipelineConfig,

    /// Loaded dataset (None until a load succeeds).
    dataset: Option<WellLogDataset>,

    /// Selected feature columns, kept in dataset column order.
    selected: Vec<String>,

    /// Last successfully prepared plot.
    plot: Option<PlotSpec>,

    /// Cleared by a failed load, set again by the next successful one.
    plotting_enabled: bool,

    /// Status / error message shown in the UI.
    status_message: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Session {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            dataset: None,
            selected: Vec::new(),
            plot: None,
            plotting_enabled: false,
            status_message: None,
        }
    }

    pub fn dataset(&self) -> Option<&WellLogDataset> {
        self.dataset.as_ref()
    }

    pub fn plot(&self) -> Option<&PlotSpec> {
        self.plot.as_ref()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn can_plot(&self) -> bool {
        self.plotting_enabled && self.dataset.is_some()
    }

    /// Load a file, replacing the current dataset wholesale on success.
    ///
    /// On failure the previous dataset (if any) is kept but plotting is
    /// disabled until a load succeeds.
    pub fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        match loader::load(path, &self.config) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with features {:?}",
                    dataset.len(),
                    dataset.feature_columns()
                );
                self.dataset = Some(dataset);
                self.selected.clear();
                self.plot = None;
                self.plotting_enabled = true;
                self.status_message = None;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.plotting_enabled = false;
                self.status_message = Some(format!("Failed to load file: {e}"));
                Err(e)
            }
        }
    }

    /// Feature candidates of the loaded dataset, in column order.
    pub fn feature_columns(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .map(WellLogDataset::feature_columns)
            .unwrap_or_default()
    }

    pub fn is_selected(&self, feature: &str) -> bool {
        self.selected.iter().any(|s| s == feature)
    }

    pub fn selected_features(&self) -> &[String] {
        &self.selected
    }

    /// Toggle a feature in the selection. Unknown names are ignored.
    /// The selection stays ordered like the dataset's columns, whatever
    /// the order the user clicked in.
    pub fn toggle_feature(&mut self, feature: &str) {
        let features = self.feature_columns();
        if !features.iter().any(|f| f == feature) {
            return;
        }
        if let Some(pos) = self.selected.iter().position(|s| s == feature) {
            self.selected.remove(pos);
        } else {
            self.selected.push(feature.to_string());
            self.selected
                .sort_by_key(|s| features.iter().position(|f| f == s));
        }
    }

    /// Prepare a plot from the current selection.
    ///
    /// On failure the previously prepared plot is left untouched.
    pub fn prepare_plot(&mut self) -> Result<&PlotSpec, PrepareError> {
        let result = match &self.dataset {
            Some(ds) if self.plotting_enabled => prepare::prepare(
                ds,
                &self.config.depth_column,
                &self.selected,
                self.config.max_features,
            ),
            _ => Err(PrepareError::NoDataset),
        };
        match result {
            Ok(spec) => {
                self.status_message = None;
                Ok(self.plot.insert(spec))
            }
            Err(e) => {
                log::error!("Failed to plot: {e}");
                self.status_message = Some(e.to_string());
                Err(e)
            }
        }
    }
}
