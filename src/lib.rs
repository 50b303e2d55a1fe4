//! Aggregation core for repeated-trial experiment output.
//!
//! Each configuration directory holds one run file per independent trial.
//! [`labels`] derives short distinguishing names for the directories;
//! [`aggregator`] parses a directory's runs once and caches mean, median,
//! standard deviation, standard error and min/max envelopes per quantity and
//! generation; [`plot`] turns those into ready-to-draw series.
//!
//! ```no_run
//! use genplot::{resolve_labels, RunDataAggregator, StatisticKind};
//!
//! let dirs = resolve_labels(&["runs/ga_pop100", "runs/ga_pop200"])?;
//! let mut agg = RunDataAggregator::new();
//! for (label, dir) in &dirs {
//!     agg.aggregate(label, dir)?;
//! }
//! let mean = agg.get("pop100", "bestFitness", StatisticKind::Mean)?;
//! # Ok::<(), genplot::DataError>(())
//! ```

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod labels;
pub mod plot;
pub mod state;

pub use aggregator::RunDataAggregator;
pub use config::{AggregatorConfig, Config, LabelConfig, LabelStrategy};
pub use data::loader::{FsSource, RunSource};
pub use data::model::{AggregateSeries, QuantitySet, StatisticKind};
pub use error::{DataError, Result};
pub use labels::{resolve_labels, SourceLabelResolver};
pub use plot::{build_series, ErrorBars, PlotKind, PlotSeries};
pub use state::Session;
