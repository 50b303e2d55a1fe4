use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// StatisticKind – which aggregate curve to read
// ---------------------------------------------------------------------------

/// One of the six per-generation aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatisticKind {
    Mean,
    Median,
    /// Population standard deviation across runs.
    Std,
    /// Standard error, `std / sqrt(runs)`.
    Ste,
    /// `mean - min`, an offset below the mean.
    MinDeviation,
    /// `max - mean`, an offset above the mean.
    MaxDeviation,
}

impl StatisticKind {
    pub const ALL: [StatisticKind; 6] = [
        StatisticKind::Mean,
        StatisticKind::Median,
        StatisticKind::Std,
        StatisticKind::Ste,
        StatisticKind::MinDeviation,
        StatisticKind::MaxDeviation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatisticKind::Mean => "mean",
            StatisticKind::Median => "median",
            StatisticKind::Std => "std",
            StatisticKind::Ste => "ste",
            StatisticKind::MinDeviation => "minDeviation",
            StatisticKind::MaxDeviation => "maxDeviation",
        }
    }
}

impl fmt::Display for StatisticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown statistic '{0}'")]
pub struct UnknownStatistic(pub String);

impl FromStr for StatisticKind {
    type Err = UnknownStatistic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(StatisticKind::Mean),
            "median" => Ok(StatisticKind::Median),
            "std" => Ok(StatisticKind::Std),
            "ste" => Ok(StatisticKind::Ste),
            "mindeviation" | "min" => Ok(StatisticKind::MinDeviation),
            "maxdeviation" | "max" => Ok(StatisticKind::MaxDeviation),
            _ => Err(UnknownStatistic(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// RunTable – one parsed run file
// ---------------------------------------------------------------------------

/// Column-major contents of a single run file.
#[derive(Debug, Clone, PartialEq)]
pub struct RunTable {
    /// Quantity names in header order.
    pub quantities: Vec<String>,
    /// One observation sequence per quantity, same order as `quantities`.
    pub columns: Vec<Vec<f64>>,
}

impl RunTable {
    /// Number of generations (rows) in this run.
    pub fn generations(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }
}

// ---------------------------------------------------------------------------
// AggregateSeries – the six curves for one (configuration, quantity)
// ---------------------------------------------------------------------------

/// Generation-indexed aggregates across all runs of one configuration.
///
/// `min_deviation` / `max_deviation` are offsets from the mean, ready to be
/// used as asymmetric error bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSeries {
    /// Number of runs that contributed.
    pub runs: usize,
    pub mean: Vec<f64>,
    pub median: Vec<f64>,
    pub std: Vec<f64>,
    pub ste: Vec<f64>,
    pub min_deviation: Vec<f64>,
    pub max_deviation: Vec<f64>,
}

impl AggregateSeries {
    pub fn get(&self, kind: StatisticKind) -> &[f64] {
        match kind {
            StatisticKind::Mean => &self.mean,
            StatisticKind::Median => &self.median,
            StatisticKind::Std => &self.std,
            StatisticKind::Ste => &self.ste,
            StatisticKind::MinDeviation => &self.min_deviation,
            StatisticKind::MaxDeviation => &self.max_deviation,
        }
    }

    pub fn generations(&self) -> usize {
        self.mean.len()
    }
}

/// All aggregated quantities of one configuration, keyed by quantity name.
pub type ConfigurationSeries = BTreeMap<String, AggregateSeries>;

// ---------------------------------------------------------------------------
// QuantitySet – union of every quantity name seen so far
// ---------------------------------------------------------------------------

/// Monotonically growing set of quantity names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantitySet {
    names: BTreeSet<String>,
}

impl QuantitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `other` into `self`, returning the names that were new.
    pub fn merge<I, S>(&mut self, other: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        other
            .into_iter()
            .map(Into::into)
            .filter(|name| self.names.insert(name.clone()))
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Sorted snapshot.
    pub fn to_vec(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistic_names_parse_back() {
        for kind in StatisticKind::ALL {
            assert_eq!(kind.name().parse::<StatisticKind>(), Ok(kind));
        }
        assert_eq!("MIN".parse::<StatisticKind>(), Ok(StatisticKind::MinDeviation));
        assert_eq!("max".parse::<StatisticKind>(), Ok(StatisticKind::MaxDeviation));
        assert_eq!(
            "variance".parse::<StatisticKind>(),
            Err(UnknownStatistic("variance".into()))
        );
    }

    #[test]
    fn test_quantity_set_merge_reports_new_names() {
        let mut set = QuantitySet::new();
        assert_eq!(set.merge(["b", "a"]), vec!["b", "a"]);
        assert_eq!(set.merge(["a", "c"]), vec!["c"]);
        assert_eq!(set.to_vec(), vec!["a", "b", "c"]);
        assert!(set.contains("c"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_series_serializes_camel_case() {
        let series = AggregateSeries {
            runs: 2,
            mean: vec![3.0],
            median: vec![3.0],
            std: vec![1.0],
            ste: vec![0.5],
            min_deviation: vec![1.0],
            max_deviation: vec![1.0],
        };
        let json = serde_json::to_value(&series).unwrap();
        assert!(json.get("minDeviation").is_some());
        assert!(json.get("maxDeviation").is_some());
        assert_eq!(series.get(StatisticKind::Ste), &[0.5]);
        assert_eq!(series.generations(), 1);
    }

    #[test]
    fn test_run_table_generations() {
        let table = RunTable {
            quantities: vec!["a".into(), "b".into()],
            columns: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        };
        assert_eq!(table.generations(), 2);
        assert_eq!(RunTable { quantities: vec![], columns: vec![] }.generations(), 0);
    }
}
