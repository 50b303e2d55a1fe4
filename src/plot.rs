use serde::{Deserialize, Serialize};

use crate::aggregator::RunDataAggregator;
use crate::data::loader::RunSource;
use crate::data::model::StatisticKind;
use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Plot modes
// ---------------------------------------------------------------------------

/// Which aggregate forms the centre line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlotKind {
    #[default]
    Mean,
    Median,
}

impl PlotKind {
    pub fn statistic(self) -> StatisticKind {
        match self {
            PlotKind::Mean => StatisticKind::Mean,
            PlotKind::Median => StatisticKind::Median,
        }
    }
}

/// Which aggregates, if any, form the error bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorBars {
    #[default]
    None,
    StdDev,
    StdErr,
    /// Asymmetric: down to the run minimum, up to the run maximum.
    MinMax,
}

impl ErrorBars {
    /// Statistics for the (lower, upper) offsets.
    pub fn statistics(self) -> Option<(StatisticKind, StatisticKind)> {
        match self {
            ErrorBars::None => None,
            ErrorBars::StdDev => Some((StatisticKind::Std, StatisticKind::Std)),
            ErrorBars::StdErr => Some((StatisticKind::Ste, StatisticKind::Ste)),
            ErrorBars::MinMax => Some((StatisticKind::MinDeviation, StatisticKind::MaxDeviation)),
        }
    }
}

// ---------------------------------------------------------------------------
// PlotSeries – one ready-to-draw line
// ---------------------------------------------------------------------------

/// One line for one (configuration, quantity) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSeries {
    /// Legend entry, `"<label> - <quantity>"`.
    pub name: String,
    pub label: String,
    pub quantity: String,
    /// Generation index of each point.
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Offsets below `y`, when error bars are requested.
    pub lower: Option<Vec<f64>>,
    /// Offsets above `y`.
    pub upper: Option<Vec<f64>>,
}

impl PlotSeries {
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.x.iter().zip(&self.y).map(|(&x, &y)| [x, y]).collect()
    }

    /// Absolute `(low, high)` bounds per point, if error bars are present.
    pub fn envelope(&self) -> Option<Vec<(f64, f64)>> {
        let (lower, upper) = (self.lower.as_ref()?, self.upper.as_ref()?);
        Some(
            self.y
                .iter()
                .zip(lower.iter().zip(upper))
                .map(|(&y, (&lo, &hi))| (y - lo, y + hi))
                .collect(),
        )
    }
}

/// Generation axis `0, 1, ..., n - 1`.
pub fn generation_axis(n: usize) -> Vec<f64> {
    (0..n).map(|g| g as f64).collect()
}

/// Build a plot series from aggregated data.
pub fn build_series<S: RunSource>(
    aggregator: &RunDataAggregator<S>,
    label: &str,
    quantity: &str,
    kind: PlotKind,
    bars: ErrorBars,
) -> Result<PlotSeries> {
    let series = aggregator.series(label, quantity).ok_or_else(|| {
        DataError::series_not_found(label, quantity, kind.statistic().name())
    })?;

    let y = series.get(kind.statistic()).to_vec();
    let (lower, upper) = match bars.statistics() {
        Some((lo, hi)) => (Some(series.get(lo).to_vec()), Some(series.get(hi).to_vec())),
        None => (None, None),
    };

    Ok(PlotSeries {
        name: format!("{label} - {quantity}"),
        label: label.to_string(),
        quantity: quantity.to_string(),
        x: generation_axis(y.len()),
        y,
        lower,
        upper,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_bar_statistics() {
        assert_eq!(ErrorBars::None.statistics(), None);
        assert_eq!(
            ErrorBars::MinMax.statistics(),
            Some((StatisticKind::MinDeviation, StatisticKind::MaxDeviation))
        );
        assert_eq!(PlotKind::Median.statistic(), StatisticKind::Median);
    }

    #[test]
    fn test_envelope_uses_offsets() {
        let series = PlotSeries {
            name: "a - f".into(),
            label: "a".into(),
            quantity: "f".into(),
            x: generation_axis(2),
            y: vec![3.0, 5.0],
            lower: Some(vec![1.0, 0.5]),
            upper: Some(vec![2.0, 0.0]),
        };
        assert_eq!(series.points(), vec![[0.0, 3.0], [1.0, 5.0]]);
        assert_eq!(series.envelope(), Some(vec![(2.0, 5.0), (4.5, 5.0)]));
    }

    #[test]
    fn test_plot_modes_deserialize() {
        let bars: ErrorBars = serde_json::from_str("\"min-max\"").unwrap();
        assert_eq!(bars, ErrorBars::MinMax);
        let kind: PlotKind = serde_json::from_str("\"median\"").unwrap();
        assert_eq!(kind, PlotKind::Median);
    }
}
