use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cache::SeriesCache;
use crate::config::AggregatorConfig;
use crate::data::loader::{parse_run, FsSource, RunSource};
use crate::data::model::{AggregateSeries, ConfigurationSeries, QuantitySet, RunTable, StatisticKind};
use crate::data::stats::RunMatrix;
use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// RunDataAggregator
// ---------------------------------------------------------------------------

/// Turns directories of run files into cached per-generation aggregates.
///
/// Aggregation is all-or-nothing per directory: a parse, shape or read
/// failure leaves both the cache and the known quantity set untouched.
#[derive(Debug)]
pub struct RunDataAggregator<S = FsSource> {
    source: S,
    config: AggregatorConfig,
    cache: SeriesCache,
    quantities: QuantitySet,
}

impl RunDataAggregator<FsSource> {
    /// Filesystem-backed aggregator with default settings.
    pub fn new() -> Self {
        Self {
            source: FsSource,
            config: AggregatorConfig::default(),
            cache: SeriesCache::new(),
            quantities: QuantitySet::new(),
        }
    }

    pub fn with_config(config: AggregatorConfig) -> Result<Self> {
        Self::with_source(FsSource, config)
    }
}

impl Default for RunDataAggregator<FsSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RunSource> RunDataAggregator<S> {
    pub fn with_source(source: S, config: AggregatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            cache: SeriesCache::new(),
            quantities: QuantitySet::new(),
        })
    }

    /// Aggregate every run file in `dir` under `label`.
    ///
    /// No-op when `label` is already cached. A directory without run files
    /// is cached with no quantities.
    pub fn aggregate(&mut self, label: &str, dir: &Path) -> Result<()> {
        if label.is_empty() {
            return Err(DataError::invalid_config("configuration label must not be empty"));
        }
        if self.cache.contains(label) {
            log::trace!("'{label}' already aggregated");
            return Ok(());
        }

        let runs = self.source.list_runs(dir, &self.config.extensions)?;
        let tables = runs
            .into_iter()
            .map(|path| {
                let bytes = self.source.read_run(&path)?;
                let table = parse_run(&bytes, &path, &self.config)?;
                Ok((path, table))
            })
            .collect::<Result<Vec<_>>>()?;

        let series = aggregate_tables(label, &tables)?;

        let added = self.quantities.merge(series.keys().cloned());
        log::debug!(
            "aggregated '{label}' from {}: {} runs, {} quantities ({} new)",
            dir.display(),
            tables.len(),
            series.len(),
            added.len()
        );
        self.cache.insert_if_absent(label, series);
        Ok(())
    }

    /// One aggregate curve, one value per generation.
    pub fn get(&self, label: &str, quantity: &str, kind: StatisticKind) -> Result<&[f64]> {
        self.cache
            .series(label, quantity)
            .map(|series| series.get(kind))
            .ok_or_else(|| DataError::series_not_found(label, quantity, kind.name()))
    }

    /// Like [`get`](Self::get) with the statistic given by name
    /// (`"mean"`, `"minDeviation"`, ...).
    pub fn get_named(&self, label: &str, quantity: &str, statistic: &str) -> Result<&[f64]> {
        let kind: StatisticKind = statistic
            .parse()
            .map_err(|_| DataError::series_not_found(label, quantity, statistic))?;
        self.get(label, quantity, kind)
    }

    /// Sorted union of every quantity seen in any aggregated directory.
    pub fn known_quantities(&self) -> Vec<String> {
        self.quantities.to_vec()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.cache.contains(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cache.labels()
    }

    pub fn series(&self, label: &str, quantity: &str) -> Option<&AggregateSeries> {
        self.cache.series(label, quantity)
    }

    /// Quantities aggregated for `label`, or `None` if it was never aggregated.
    pub fn quantities_for(&self, label: &str) -> Option<Vec<&str>> {
        self.cache
            .get(label)
            .map(|series| series.keys().map(String::as_str).collect())
    }
}

// ---------------------------------------------------------------------------
// Two-pass stacking
// ---------------------------------------------------------------------------

struct Shape<'a> {
    runs: usize,
    generations: usize,
    first: &'a Path,
}

/// Validate every quantity's (runs, generations) shape, then fill pre-sized
/// matrices and aggregate them.
fn aggregate_tables(label: &str, tables: &[(PathBuf, RunTable)]) -> Result<ConfigurationSeries> {
    let mut shapes: BTreeMap<&str, Shape> = BTreeMap::new();
    for (path, table) in tables {
        let generations = table.generations();
        for quantity in &table.quantities {
            match shapes.entry(quantity.as_str()) {
                Entry::Vacant(slot) => {
                    slot.insert(Shape {
                        runs: 1,
                        generations,
                        first: path,
                    });
                }
                Entry::Occupied(mut slot) => {
                    let shape = slot.get_mut();
                    if shape.generations != generations {
                        log::trace!(
                            "{} sets the generation count of '{quantity}'",
                            shape.first.display()
                        );
                        return Err(DataError::Shape {
                            label: label.to_string(),
                            quantity: quantity.clone(),
                            expected: shape.generations,
                            found: generations,
                            path: path.clone(),
                        });
                    }
                    shape.runs += 1;
                }
            }
        }
    }

    let mut matrices: BTreeMap<&str, RunMatrix> = shapes
        .iter()
        .map(|(quantity, shape)| (*quantity, RunMatrix::with_shape(shape.runs, shape.generations)))
        .collect();

    for (_, table) in tables {
        for (quantity, column) in table.quantities.iter().zip(&table.columns) {
            if let Some(matrix) = matrices.get_mut(quantity.as_str()) {
                matrix.push_run(column);
            }
        }
    }

    Ok(matrices
        .into_iter()
        .map(|(quantity, matrix)| (quantity.to_string(), AggregateSeries::from_matrix(&matrix)))
        .collect())
}
