use strategy_sim::career::{CareerConfig, Milestone};
use strategy_sim::decision::ExitReason;
use strategy_sim::ensemble::{percentile, run_ensemble, run_session_batch};
use strategy_sim::strategy::StrategyOverrides;
use strategy_sim::tiers::{TierParams, TierTable};

fn small_career() -> CareerConfig {
    CareerConfig {
        years: 2,
        sessions_per_year: 24,
        milestone: Some(Milestone {
            name: "double up".to_string(),
            bankroll: 4000.0,
        }),
        ..Default::default()
    }
}

#[test]
fn ensemble_is_reproducible() {
    let config = small_career();
    let a = run_ensemble(&config, 16, 7).unwrap();
    let b = run_ensemble(&config, 16, 7).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.bands.len(), 24);
    assert_eq!(a.trajectories.len(), 16);
    assert_eq!(a.yearly_bands().count(), 2);
}

#[test]
fn bands_are_ordered_and_match_trajectories() {
    let config = small_career();
    let e = run_ensemble(&config, 25, 1).unwrap();
    for (m, band) in e.bands.iter().enumerate() {
        assert_eq!(band.month as usize, m);
        assert!(band.min <= band.p5);
        assert!(band.p5 <= band.p25);
        assert!(band.p25 <= band.p50);
        assert!(band.p50 <= band.p75);
        assert!(band.p75 <= band.p95);
        assert!(band.p95 <= band.max);
        let mut column: Vec<f64> = e.trajectories.iter().map(|t| t.bankroll[m]).collect();
        column.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(band.p50, percentile(&column, 0.5));
        assert_eq!(band.max, column[column.len() - 1]);
    }
}

#[test]
fn summary_rates_are_fractions() {
    let e = run_ensemble(&small_career(), 20, 3).unwrap();
    let s = &e.summary;
    assert_eq!(s.runs, 20);
    assert!((0.0..=1.0).contains(&s.survival_rate));
    assert!((0.0..=1.0).contains(&s.milestone_probability));
    assert_eq!(s.median_milestone_month.is_some(), s.milestone_probability > 0.0);
    let reached = e.trajectories.iter().filter(|t| t.milestone_month.is_some()).count();
    assert!((s.milestone_probability - reached as f64 / 20.0).abs() < 1e-12);
}

#[test]
fn different_seeds_differ() {
    let config = small_career();
    let a = run_ensemble(&config, 8, 1).unwrap();
    let b = run_ensemble(&config, 8, 2).unwrap();
    assert_ne!(a.trajectories, b.trajectories);
}

#[test]
fn session_batch_counts_every_exit() {
    let table = TierTable::generate(&TierParams::default()).unwrap();
    let tier = &table.tiers()[0];
    let batch = run_session_batch(&StrategyOverrides::default(), tier, 1000.0, 200, 11).unwrap();
    let total: usize = ExitReason::ALL.iter().map(|&e| batch.exit_count(e)).sum();
    assert_eq!(total, 200);
    assert!((0.0..=1.0).contains(&batch.win_rate));
    assert!(batch.mean_volume > 0.0);
    assert!(batch.worst_pnl <= batch.median_pnl && batch.median_pnl <= batch.best_pnl);
    // flat banker sessions never lose more than the stop loss
    assert!(batch.worst_pnl >= -100.0);
}

#[test]
fn session_batch_is_reproducible() {
    let table = TierTable::generate(&TierParams::default()).unwrap();
    let tier = &table.tiers()[0];
    let o = StrategyOverrides::default();
    let a = run_session_batch(&o, tier, 1000.0, 50, 4).unwrap();
    let b = run_session_batch(&o, tier, 1000.0, 50, 4).unwrap();
    assert_eq!(a, b);
}
