/// Data layer: run-file parsing, core types and per-generation statistics.
///
/// Architecture:
/// ```text
///  <config dir>/*.dat, *.div
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  RunSource → bytes → RunTable (one per run)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats   │  RunMatrix (runs × generations) → AggregateSeries
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model   │  AggregateSeries, StatisticKind, QuantitySet
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod stats;
