use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::aggregator::RunDataAggregator;
use crate::config::Config;
use crate::data::loader::{FsSource, RunSource};
use crate::error::{DataError, Result};
use crate::labels::SourceLabelResolver;
use crate::plot::{build_series, ErrorBars, PlotKind, PlotSeries};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything a viewer needs between redraws, independent of rendering:
/// resolved labels, the aggregator and the current selection.
#[derive(Debug)]
pub struct Session<S = FsSource> {
    /// label → configuration directory, resolved once.
    directories: BTreeMap<String, PathBuf>,

    aggregator: RunDataAggregator<S>,

    /// Labels currently selected for plotting.
    selected: BTreeSet<String>,
}

impl Session<FsSource> {
    /// Resolve labels for `paths` and prepare a filesystem-backed session.
    pub fn open<P: AsRef<Path>>(paths: &[P], config: &Config) -> Result<Self> {
        let aggregator = RunDataAggregator::with_config(config.aggregator.clone())?;
        Self::with_aggregator(paths, config, aggregator)
    }
}

impl<S: RunSource> Session<S> {
    pub fn with_aggregator<P: AsRef<Path>>(
        paths: &[P],
        config: &Config,
        aggregator: RunDataAggregator<S>,
    ) -> Result<Self> {
        let directories = SourceLabelResolver::new(config.labels.clone())?.resolve(paths)?;
        Ok(Self {
            directories,
            aggregator,
            selected: BTreeSet::new(),
        })
    }

    /// Resolved labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.directories.keys().map(String::as_str)
    }

    pub fn directory(&self, label: &str) -> Option<&Path> {
        self.directories.get(label).map(PathBuf::as_path)
    }

    /// Select a configuration, aggregating its directory on first use.
    /// On failure the selection is left unchanged.
    pub fn select(&mut self, label: &str) -> Result<()> {
        let dir = self
            .directories
            .get(label)
            .ok_or_else(|| DataError::configuration_not_found(label))?;
        self.aggregator.aggregate(label, dir)?;
        self.selected.insert(label.to_string());
        Ok(())
    }

    pub fn deselect(&mut self, label: &str) {
        self.selected.remove(label);
    }

    /// Select and aggregate every configuration, stopping at the first error.
    pub fn select_all(&mut self) -> Result<()> {
        let labels: Vec<String> = self.directories.keys().cloned().collect();
        for label in labels {
            self.select(&label)?;
        }
        Ok(())
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn is_selected(&self, label: &str) -> bool {
        self.selected.contains(label)
    }

    /// Quantities seen in any configuration aggregated so far.
    pub fn known_quantities(&self) -> Vec<String> {
        self.aggregator.known_quantities()
    }

    pub fn aggregator(&self) -> &RunDataAggregator<S> {
        &self.aggregator
    }

    /// One series per selected configuration and requested quantity.
    /// Quantities a configuration never recorded are skipped for it.
    pub fn visible_series(
        &self,
        quantities: &[&str],
        kind: PlotKind,
        bars: ErrorBars,
    ) -> Result<Vec<PlotSeries>> {
        let mut out = Vec::new();
        for label in &self.selected {
            for &quantity in quantities {
                if self.aggregator.series(label, quantity).is_none() {
                    continue;
                }
                out.push(build_series(&self.aggregator, label, quantity, kind, bars)?);
            }
        }
        Ok(out)
    }
}
