use super::model::AggregateSeries;

// ---------------------------------------------------------------------------
// RunMatrix – runs × generations, filled after the shape is known
// ---------------------------------------------------------------------------

/// Dense row-major matrix with one row per run.
#[derive(Debug, Clone)]
pub struct RunMatrix {
    generations: usize,
    capacity_runs: usize,
    values: Vec<f64>,
}

impl RunMatrix {
    /// Pre-size for a known `(runs, generations)` shape.
    pub fn with_shape(runs: usize, generations: usize) -> Self {
        Self {
            generations,
            capacity_runs: runs,
            values: Vec::with_capacity(runs * generations),
        }
    }

    /// Append one run. The caller has already validated the length.
    pub fn push_run(&mut self, run: &[f64]) {
        debug_assert_eq!(run.len(), self.generations);
        debug_assert!(self.runs() < self.capacity_runs);
        self.values.extend_from_slice(run);
    }

    pub fn runs(&self) -> usize {
        if self.generations == 0 {
            self.capacity_runs
        } else {
            self.values.len() / self.generations
        }
    }

    pub fn generations(&self) -> usize {
        self.generations
    }

    /// Values of every run at generation `g`.
    pub fn column(&self, g: usize) -> Vec<f64> {
        (0..self.runs())
            .map(|r| self.values[r * self.generations + g])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Per-generation aggregates
// ---------------------------------------------------------------------------

/// Aggregates of one generation across runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub ste: f64,
    pub min_deviation: f64,
    pub max_deviation: f64,
}

impl ColumnStats {
    const UNDEFINED: ColumnStats = ColumnStats {
        mean: f64::NAN,
        median: f64::NAN,
        std: f64::NAN,
        ste: f64::NAN,
        min_deviation: f64::NAN,
        max_deviation: f64::NAN,
    };

    /// Compute from the values of one generation. Empty input or any NaN
    /// yields NaN everywhere.
    pub fn compute(values: &mut [f64]) -> Self {
        let n = values.len();
        if n == 0 || values.iter().any(|v| v.is_nan()) {
            return Self::UNDEFINED;
        }

        let count = n as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
        let std = variance.sqrt();

        values.sort_by(f64::total_cmp);
        let median = if n % 2 == 0 {
            (values[n / 2 - 1] + values[n / 2]) / 2.0
        } else {
            values[n / 2]
        };
        let min = values[0];
        let max = values[n - 1];

        ColumnStats {
            mean,
            median,
            std,
            ste: std / count.sqrt(),
            // Summation rounding can push the mean a hair outside [min, max].
            min_deviation: clamp_negative(mean - min),
            max_deviation: clamp_negative(max - mean),
        }
    }
}

/// Negative offsets become zero; NaN passes through.
fn clamp_negative(offset: f64) -> f64 {
    if offset < 0.0 {
        0.0
    } else {
        offset
    }
}

impl AggregateSeries {
    /// Aggregate every generation of `matrix` across its runs.
    pub fn from_matrix(matrix: &RunMatrix) -> Self {
        let generations = matrix.generations();
        let mut series = AggregateSeries {
            runs: matrix.runs(),
            mean: Vec::with_capacity(generations),
            median: Vec::with_capacity(generations),
            std: Vec::with_capacity(generations),
            ste: Vec::with_capacity(generations),
            min_deviation: Vec::with_capacity(generations),
            max_deviation: Vec::with_capacity(generations),
        };

        for g in 0..generations {
            let stats = ColumnStats::compute(&mut matrix.column(g));
            series.mean.push(stats.mean);
            series.median.push(stats.median);
            series.std.push(stats.std);
            series.ste.push(stats.ste);
            series.min_deviation.push(stats.min_deviation);
            series.max_deviation.push(stats.max_deviation);
        }
        series
    }
}
