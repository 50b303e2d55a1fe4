use std::collections::BTreeMap;

use crate::data::model::{AggregateSeries, ConfigurationSeries};

/// Aggregated series per configuration label. An entry is written at most
/// once; later inserts for the same label are ignored.
#[derive(Debug, Clone, Default)]
pub struct SeriesCache {
    entries: BTreeMap<String, ConfigurationSeries>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    /// Store `series` under `label` unless already present. Returns whether
    /// the entry was written.
    pub fn insert_if_absent(&mut self, label: &str, series: ConfigurationSeries) -> bool {
        if self.contains(label) {
            return false;
        }
        self.entries.insert(label.to_string(), series);
        true
    }

    pub fn get(&self, label: &str) -> Option<&ConfigurationSeries> {
        self.entries.get(label)
    }

    pub fn series(&self, label: &str, quantity: &str) -> Option<&AggregateSeries> {
        self.entries.get(label)?.get(quantity)
    }

    /// Cached labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_series(mean: f64) -> ConfigurationSeries {
        let series = AggregateSeries {
            runs: 1,
            mean: vec![mean],
            median: vec![mean],
            std: vec![0.0],
            ste: vec![0.0],
            min_deviation: vec![0.0],
            max_deviation: vec![0.0],
        };
        ConfigurationSeries::from([("fitness".to_string(), series)])
    }

    #[test]
    fn test_insert_is_write_once() {
        let mut cache = SeriesCache::new();
        assert!(cache.insert_if_absent("alpha", one_series(1.0)));
        assert!(!cache.insert_if_absent("alpha", one_series(2.0)));
        assert_eq!(cache.series("alpha", "fitness").unwrap().mean, vec![1.0]);
        assert_eq!(cache.labels().count(), 1);
    }

    #[test]
    fn test_lookup_misses() {
        let mut cache = SeriesCache::new();
        assert!(!cache.contains("empty"));
        cache.insert_if_absent("empty", ConfigurationSeries::new());
        assert!(cache.contains("empty"));
        assert!(cache.series("empty", "fitness").is_none());
        assert!(cache.series("other", "fitness").is_none());
        assert_eq!(cache.labels().collect::<Vec<_>>(), vec!["empty"]);
    }
}
