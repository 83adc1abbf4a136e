//! Random-signal null benchmark.
//!
//! Repeats the return pipeline under independently seeded random signals to
//! produce the expected cumulative-return curve a real strategy has to beat.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, BTreeSet};

use super::aggregate::{self_financing_cumulative_return, RiskMetrics};
use super::error::NewsalphaError;
use super::returns::{AlignedEvent, ReturnEngine, ReturnRecord};
use super::strategy::random_signal;

/// How per-run curves are aligned before averaging across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkAlignment {
    /// A date absent from a run is excluded from that date's mean.
    SparseMean,
    /// A run carries its previous cumulative value into missing dates.
    FillForward,
}

#[derive(Debug, Clone)]
pub struct RandomBenchmark {
    pub runs: usize,
    pub seed_offset: u64,
    pub alignment: BenchmarkAlignment,
}

/// Mean cumulative curve over the union of run dates, plus metrics averaged
/// across runs (NaN entries skipped).
#[derive(Debug, Clone, PartialEq)]
pub struct RandomBenchmarkResult {
    pub curve: Vec<(NaiveDate, f64)>,
    pub metrics: RiskMetrics,
}

impl RandomBenchmark {
    /// Run `runs` seeded simulations over the aligned events. Run `i` draws
    /// every signal from `StdRng::seed_from_u64(seed_offset + i)`, so
    /// identical inputs always reproduce identical output. Events are priced
    /// once; each run only re-scores them.
    pub fn estimate(
        &self,
        engine: &ReturnEngine<'_>,
        aligned: &[AlignedEvent],
    ) -> Result<RandomBenchmarkResult, NewsalphaError> {
        let priced = engine.price_all(aligned)?;

        let mut run_curves: Vec<BTreeMap<NaiveDate, f64>> = Vec::with_capacity(self.runs);
        let mut run_metrics: Vec<RiskMetrics> = Vec::with_capacity(self.runs);

        for i in 0..self.runs {
            let mut rng = StdRng::seed_from_u64(self.seed_offset + i as u64);
            let mut records: Vec<ReturnRecord> = Vec::with_capacity(priced.len());
            // One draw per event, priced or not, keeps the draw sequence a
            // function of the event feed alone.
            for p in &priced {
                let signal = random_signal(&mut rng);
                if let Some(p) = p {
                    records.push(p.score(signal));
                }
            }

            let series = self_financing_cumulative_return(&records);
            run_metrics.push(series.metrics);
            run_curves.push(
                series
                    .points
                    .into_iter()
                    .map(|point| (point.date, point.cumulative_return))
                    .collect(),
            );
        }

        Ok(RandomBenchmarkResult {
            curve: self.mean_curve(&run_curves),
            metrics: mean_metrics(&run_metrics),
        })
    }

    fn mean_curve(&self, run_curves: &[BTreeMap<NaiveDate, f64>]) -> Vec<(NaiveDate, f64)> {
        let dates: BTreeSet<NaiveDate> = run_curves
            .iter()
            .flat_map(|curve| curve.keys().copied())
            .collect();

        let mut mean = Vec::with_capacity(dates.len());
        for date in dates {
            let mut sum = 0.0;
            let mut count = 0usize;
            for curve in run_curves {
                let value = match self.alignment {
                    BenchmarkAlignment::SparseMean => curve.get(&date).copied(),
                    BenchmarkAlignment::FillForward => {
                        curve.range(..=date).next_back().map(|(_, v)| *v)
                    }
                };
                if let Some(v) = value {
                    sum += v;
                    count += 1;
                }
            }
            if count > 0 {
                mean.push((date, sum / count as f64));
            }
        }
        mean
    }
}

fn nan_mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        if !v.is_nan() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

fn mean_metrics(metrics: &[RiskMetrics]) -> RiskMetrics {
    RiskMetrics {
        sharpe: nan_mean(metrics.iter().map(|m| m.sharpe)),
        mean_daily_pct: nan_mean(metrics.iter().map(|m| m.mean_daily_pct)),
        std_daily_pct: nan_mean(metrics.iter().map(|m| m.std_daily_pct)),
        max_drawdown_pct: nan_mean(metrics.iter().map(|m| m.max_drawdown_pct)),
    }
}
