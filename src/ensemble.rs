//! Monte Carlo ensembles: many careers (or many sessions) in parallel,
//! reduced to percentile bands and summary statistics.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::career::{career_table, run_career, CareerConfig, CareerTrajectory};
use crate::decision::ExitReason;
use crate::error::{SimError, SimResult};
use crate::rng::SeededDraw;
use crate::session::{run_session, SessionSummary};
use crate::state::SessionPlan;
use crate::strategy::StrategyOverrides;
use crate::tiers::TierConfig;

/// Percentiles reported per month, in order.
pub const BAND_PERCENTILES: [f64; 5] = [0.05, 0.25, 0.50, 0.75, 0.95];

// ---------------------------------------------------------------------------
// Percentiles
// ---------------------------------------------------------------------------

/// Nearest-rank percentile of an ascending slice. `p` in [0, 1].
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

// ---------------------------------------------------------------------------
// Career ensembles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub month: u32,
    pub min: f64,
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub max: f64,
}

impl Band {
    fn from_sorted(month: u32, values: &[f64]) -> Self {
        Band {
            month,
            min: values.first().copied().unwrap_or(0.0),
            p5: percentile(values, BAND_PERCENTILES[0]),
            p25: percentile(values, BAND_PERCENTILES[1]),
            p50: percentile(values, BAND_PERCENTILES[2]),
            p75: percentile(values, BAND_PERCENTILES[3]),
            p95: percentile(values, BAND_PERCENTILES[4]),
            max: values.last().copied().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSummary {
    pub runs: usize,
    /// Share of runs that finish at or above the insolvency floor.
    pub survival_rate: f64,
    pub mean_final_bankroll: f64,
    pub median_final_bankroll: f64,
    pub mean_tax_paid: f64,
    pub mean_contributed: f64,
    pub mean_insolvent_months: f64,
    pub milestone_probability: f64,
    pub median_milestone_month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    pub bands: Vec<Band>,
    pub summary: EnsembleSummary,
    pub trajectories: Vec<CareerTrajectory>,
}

impl Ensemble {
    /// Bands at the end of each year.
    pub fn yearly_bands(&self) -> impl Iterator<Item = &Band> {
        self.bands.iter().filter(|b| b.month % 12 == 11)
    }
}

/// Run `runs` careers; run `i` draws from `StdRng::seed_from_u64(seed + i)`.
pub fn run_ensemble(config: &CareerConfig, runs: usize, seed: u64) -> SimResult<Ensemble> {
    if runs == 0 {
        return Err(SimError::InvalidValue("ensemble needs at least one run".to_string()));
    }
    config.validate()?;
    let table = career_table(config)?;

    let trajectories: Vec<CareerTrajectory> = (0..runs)
        .into_par_iter()
        .map(|i| {
            let mut source = SeededDraw::new(seed.wrapping_add(i as u64));
            run_career(config, &table, &mut source)
        })
        .collect::<SimResult<Vec<_>>>()?;

    let months = config.months();
    let bands = (0..months)
        .map(|m| {
            let column = trajectories
                .iter()
                .map(|t| t.bankroll.get(m as usize).copied().unwrap_or(0.0))
                .collect();
            Band::from_sorted(m, &sorted(column))
        })
        .collect();

    let summary = summarize(config, &trajectories);
    info!(
        runs,
        survival = summary.survival_rate,
        median_final = summary.median_final_bankroll,
        "ensemble finished"
    );
    Ok(Ensemble {
        bands,
        summary,
        trajectories,
    })
}

fn summarize(config: &CareerConfig, trajectories: &[CareerTrajectory]) -> EnsembleSummary {
    let runs = trajectories.len();
    let finals = sorted(trajectories.iter().map(|t| t.final_bankroll()).collect());
    let survivors = finals
        .iter()
        .filter(|&&b| b >= config.insolvency_floor)
        .count();
    let milestone_months: Vec<f64> = sorted(
        trajectories
            .iter()
            .filter_map(|t| t.milestone_month.map(f64::from))
            .collect(),
    );

    EnsembleSummary {
        runs,
        survival_rate: survivors as f64 / runs as f64,
        mean_final_bankroll: mean(finals.iter().copied()),
        median_final_bankroll: percentile(&finals, 0.5),
        mean_tax_paid: mean(trajectories.iter().map(|t| t.tax_paid)),
        mean_contributed: mean(trajectories.iter().map(|t| t.contributed)),
        mean_insolvent_months: mean(trajectories.iter().map(|t| t.insolvent_months as f64)),
        milestone_probability: milestone_months.len() as f64 / runs as f64,
        median_milestone_month: (!milestone_months.is_empty())
            .then(|| percentile(&milestone_months, 0.5) as u32),
    }
}

// ---------------------------------------------------------------------------
// Session batches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBatch {
    pub sessions: usize,
    pub exits: BTreeMap<String, usize>,
    pub mean_pnl: f64,
    pub median_pnl: f64,
    pub win_rate: f64,
    pub mean_volume: f64,
    pub mean_hands: f64,
    pub worst_pnl: f64,
    pub best_pnl: f64,
}

impl SessionBatch {
    pub fn exit_count(&self, exit: ExitReason) -> usize {
        self.exits.get(exit.as_str()).copied().unwrap_or(0)
    }

    /// Expected loss per unit of volume, as a fraction.
    pub fn edge(&self) -> f64 {
        if self.mean_volume > 0.0 {
            self.mean_pnl / self.mean_volume
        } else {
            0.0
        }
    }
}

/// Play `n` independent sessions from the same starting bankroll.
pub fn run_session_batch(
    overrides: &StrategyOverrides,
    tier: &TierConfig,
    bankroll: f64,
    n: usize,
    seed: u64,
) -> SimResult<SessionBatch> {
    if n == 0 {
        return Err(SimError::InvalidValue("batch needs at least one session".to_string()));
    }
    overrides.validate()?;

    let summaries: Vec<SessionSummary> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut source = SeededDraw::new(seed.wrapping_add(i as u64));
            run_session(overrides, tier, bankroll, SessionPlan::Standard, &mut source)
        })
        .collect::<SimResult<Vec<_>>>()?;

    let mut exits: BTreeMap<String, usize> = BTreeMap::new();
    for s in &summaries {
        *exits.entry(s.exit.as_str().to_string()).or_insert(0) += 1;
    }
    let pnls = sorted(summaries.iter().map(|s| s.pnl).collect());
    let wins = summaries.iter().filter(|s| s.won()).count();

    Ok(SessionBatch {
        sessions: n,
        exits,
        mean_pnl: mean(pnls.iter().copied()),
        median_pnl: percentile(&pnls, 0.5),
        win_rate: wins as f64 / n as f64,
        mean_volume: mean(summaries.iter().map(|s| s.volume)),
        mean_hands: mean(summaries.iter().map(|s| s.hands_played as f64)),
        worst_pnl: pnls.first().copied().unwrap_or(0.0),
        best_pnl: pnls.last().copied().unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_rank_percentile() {
        let v: Vec<f64> = (0..=10).map(f64::from).collect();
        assert_eq!(percentile(&v, 0.0), 0.0);
        assert_eq!(percentile(&v, 0.5), 5.0);
        assert_eq!(percentile(&v, 0.95), 10.0);
        assert_eq!(percentile(&v, 0.25), 3.0);
        assert_eq!(percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn band_is_ordered() {
        let v = sorted(vec![5.0, 1.0, 9.0, 3.0, 7.0]);
        let b = Band::from_sorted(0, &v);
        assert!(b.min <= b.p5 && b.p5 <= b.p25 && b.p25 <= b.p50);
        assert!(b.p50 <= b.p75 && b.p75 <= b.p95 && b.p95 <= b.max);
        assert_eq!(b.p50, 5.0);
    }

    #[test]
    fn zero_runs_rejected() {
        assert!(run_ensemble(&CareerConfig::default(), 0, 1).is_err());
    }
}
