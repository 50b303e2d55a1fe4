use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use genplot::{Config, ErrorBars, PlotKind, Session};

/// Seeded splitmix64 stream; sample data only needs to be repeatable.
struct Noise(u64);

impl Noise {
    fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Zero-mean normal sample with standard deviation `sigma`.
    fn normal(&mut self, sigma: f64) -> f64 {
        let radius = (-2.0 * self.uniform().max(f64::MIN_POSITIVE).ln()).sqrt();
        let angle = std::f64::consts::TAU * self.uniform();
        sigma * radius * angle.cos()
    }
}

const GENERATIONS: usize = 101;
const RUNS: usize = 10;
const OUTPUT_DIR: &str = "sample_runs";

/// Fitness curve of one run: saturating growth towards `ceiling`, with noise.
fn fitness_curve(noise: &mut Noise, rate: f64, ceiling: f64) -> Vec<(f64, f64)> {
    let mut best = 0.0f64;
    (0..GENERATIONS)
        .map(|g| {
            let expected = ceiling * (1.0 - (-rate * g as f64).exp());
            let mean = (expected + noise.normal(0.02 * ceiling)).max(0.0);
            best = best.max(mean + (0.1 + noise.normal(0.03)).abs() * ceiling);
            (best, mean)
        })
        .collect()
}

/// `.dat` run: best and mean fitness per generation.
fn write_dat(path: &Path, rows: &[(f64, f64)]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?);
    writeln!(out, "\"bestFitness\" \"meanFitness\"")?;
    for (best, mean) in rows {
        writeln!(out, "{best:.6} {mean:.6}")?;
    }
    out.flush()?;
    Ok(())
}

/// `.div` run: population diversity, written with the stray trailing
/// delimiter some experiment scripts emit.
fn write_div(path: &Path, noise: &mut Noise, mutation: f64) -> Result<()> {
    let mut out = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?);
    writeln!(out, "diversity ")?;
    for g in 0..GENERATIONS {
        let decay = (-(g as f64) / (40.0 / mutation.sqrt())).exp();
        let value = (0.2 + 0.8 * decay + noise.normal(0.02)).clamp(0.0, 1.0);
        writeln!(out, "{value:.6} ")?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut noise = Noise(42);
    let populations = [100u32, 200];
    let mutations = [("01", 0.01), ("05", 0.05)];

    let mut directories = Vec::new();
    for &pop in &populations {
        for &(tag, mutation) in &mutations {
            let dir = Path::new(OUTPUT_DIR).join(format!("ga_pop{pop}_mut{tag}_elitist"));
            fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

            let rate = 0.02 + mutation * (pop as f64 / 100.0);
            for run in 0..RUNS {
                let rows = fitness_curve(&mut noise, rate, 1.0);
                write_dat(&dir.join(format!("run_{run:02}.dat")), &rows)?;
                write_div(&dir.join(format!("run_{run:02}.div")), &mut noise, mutation)?;
            }
            log::info!("wrote {RUNS} runs to {}", dir.display());
            directories.push(dir);
        }
    }

    let mut session = Session::open(&directories, &Config::default())
        .context("resolving configuration labels")?;
    session.select_all().context("aggregating sample runs")?;

    let quantities = session.known_quantities();
    let names: Vec<&str> = quantities.iter().map(String::as_str).collect();
    let series = session.visible_series(&names, PlotKind::Mean, ErrorBars::MinMax)?;
    for s in &series {
        if let (Some(&last), Some(envelope)) = (s.y.last(), s.envelope()) {
            let (lo, hi) = envelope.last().copied().unwrap_or((last, last));
            log::info!("{}: final mean {last:.3} in [{lo:.3}, {hi:.3}]", s.name);
        }
    }

    println!(
        "Wrote {} configurations × {RUNS} runs ({GENERATIONS} generations) to {OUTPUT_DIR}/; labels: {}",
        directories.len(),
        session.labels().collect::<Vec<_>>().join(", ")
    );
    Ok(())
}
