//! Return aggregation: per-date averages, compounded cumulative series, and
//! risk metrics.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::event::Signal;
use super::returns::ReturnRecord;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Which per-event return feeds the aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnBasis {
    Excess,
    Raw,
}

/// Risk metrics over a per-date return sequence. Percentage fields are x100
/// of their fractional form; an undefined Sharpe (fewer than two dates, or
/// zero variance) is NaN, never an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskMetrics {
    pub sharpe: f64,
    pub mean_daily_pct: f64,
    pub std_daily_pct: f64,
    pub max_drawdown_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub average_return: f64,
    pub cumulative_return: f64,
}

/// Date-ordered cumulative return curve with one metrics block for the whole
/// series.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeSeries {
    pub points: Vec<CumulativePoint>,
    pub metrics: RiskMetrics,
}

impl CumulativeSeries {
    fn from_daily_returns(daily: BTreeMap<NaiveDate, f64>) -> Self {
        let mut points = Vec::with_capacity(daily.len());
        let mut cumulative = 1.0;
        for (date, average_return) in daily {
            cumulative *= 1.0 + average_return;
            points.push(CumulativePoint {
                date,
                average_return,
                cumulative_return: cumulative,
            });
        }
        let returns: Vec<f64> = points.iter().map(|p| p.average_return).collect();
        CumulativeSeries {
            metrics: compute_metrics(&returns),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn daily_averages(
    records: &[ReturnRecord],
    mut pick: impl FnMut(&ReturnRecord) -> Option<f64>,
) -> BTreeMap<NaiveDate, f64> {
    let mut sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for record in records {
        if let Some(value) = pick(record) {
            let entry = sums.entry(record.trade_date).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(date, (sum, count))| (date, sum / count as f64))
        .collect()
}

/// Group records by trade date, average the chosen return within each date,
/// and compound the per-date averages into a cumulative curve.
pub fn cumulative_return(records: &[ReturnRecord], basis: ReturnBasis) -> CumulativeSeries {
    let daily = daily_averages(records, |r| {
        Some(match basis {
            ReturnBasis::Excess => r.excess_return,
            ReturnBasis::Raw => r.raw_return,
        })
    });
    CumulativeSeries::from_daily_returns(daily)
}

/// Zero-net-exposure long/short book: average the long and short legs
/// separately per date, treat a missing leg as 0, and compound the summed
/// daily return. Neutral records belong to neither leg.
pub fn self_financing_cumulative_return(records: &[ReturnRecord]) -> CumulativeSeries {
    let long = daily_averages(records, |r| {
        (r.signal == Signal::Long).then_some(r.excess_return)
    });
    let short = daily_averages(records, |r| {
        (r.signal == Signal::Short).then_some(r.excess_return)
    });

    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, value) in long.into_iter().chain(short) {
        *daily.entry(date).or_insert(0.0) += value;
    }
    CumulativeSeries::from_daily_returns(daily)
}

/// Mean, sample std, annualized Sharpe, and max drawdown of the compounded
/// curve. Empty input yields NaN metrics.
pub fn compute_metrics(returns: &[f64]) -> RiskMetrics {
    if returns.is_empty() {
        return RiskMetrics {
            sharpe: f64::NAN,
            mean_daily_pct: f64::NAN,
            std_daily_pct: f64::NAN,
            max_drawdown_pct: f64::NAN,
        };
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;

    let std = if returns.len() < 2 {
        f64::NAN
    } else {
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    };

    // NaN or zero std both fall through to the undefined sentinel.
    let sharpe = if std > 0.0 {
        (mean / std) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        f64::NAN
    };

    RiskMetrics {
        sharpe,
        mean_daily_pct: mean * 100.0,
        std_daily_pct: std * 100.0,
        max_drawdown_pct: max_drawdown(returns) * 100.0,
    }
}

/// Minimum of cumulative/running-peak - 1 over the compounded curve; 0 for a
/// curve that never falls below its peak.
fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for r in returns {
        cumulative *= 1.0 + r;
        if cumulative > peak {
            peak = cumulative;
        }
        let drawdown = cumulative / peak - 1.0;
        if drawdown < worst {
            worst = drawdown;
        }
    }
    worst
}
