use approx::assert_relative_eq;
use strategy_sim::career::{
    career_table, run_career, CareerConfig, CareerLeg, ContributionRule, EventKind, TaxRule,
};
use strategy_sim::outcome::BaccaratOutcome;
use strategy_sim::progression::PressMode;
use strategy_sim::rng::{ScriptedDraw, SeededDraw};
use strategy_sim::strategy::{RecoveryConfig, StrategyOverrides};
use strategy_sim::tiers::TierMode;

fn one_year(start: f64, sessions_per_year: u32) -> CareerConfig {
    CareerConfig {
        start_bankroll: start,
        years: 1,
        sessions_per_year,
        ..Default::default()
    }
}

#[test]
fn sessions_spread_over_months() {
    let config = one_year(1000.0, 50);
    let per_month: Vec<u32> = (0..12).map(|m| config.sessions_in_month(m)).collect();
    assert_eq!(per_month[0], 5);
    assert_eq!(per_month[1], 5);
    assert_eq!(per_month[2], 4);
    assert_eq!(per_month.iter().sum::<u32>(), 50);
    assert_eq!(config.sessions_in_month(12), 5);
}

#[test]
fn same_seed_same_trajectory() {
    let config = CareerConfig {
        years: 2,
        ..Default::default()
    };
    let table = career_table(&config).unwrap();
    let a = run_career(&config, &table, &mut SeededDraw::new(42)).unwrap();
    let b = run_career(&config, &table, &mut SeededDraw::new(42)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.bankroll.len(), 24);
    assert_eq!(a.leg_by_month.len(), 24);
    assert!(a.sessions_played <= 100);
}

#[test]
fn promotion_takes_effect_next_month() {
    let config = CareerConfig {
        start_bankroll: 2000.0,
        years: 1,
        sessions_per_year: 12,
        legs: vec![
            CareerLeg {
                name: "opener".to_string(),
                overrides: StrategyOverrides::default(),
                target_bankroll: Some(0.0),
            },
            CareerLeg {
                name: "closer".to_string(),
                overrides: StrategyOverrides {
                    press_mode: PressMode::Titan,
                    ..Default::default()
                },
                target_bankroll: None,
            },
        ],
        ..Default::default()
    };
    let table = career_table(&config).unwrap();
    let t = run_career(&config, &table, &mut SeededDraw::new(3)).unwrap();

    assert_eq!(t.leg_by_month[0], 0);
    assert!(t.leg_by_month[1..].iter().all(|&leg| leg == 1));
    let reached: Vec<u32> = t.events_of(EventKind::TargetReached).map(|e| e.month).collect();
    let promoted: Vec<u32> = t.events_of(EventKind::Promotion).map(|e| e.month).collect();
    assert_eq!(reached, vec![0]);
    assert_eq!(promoted, vec![1]);
}

#[test]
fn insolvent_months_are_skipped() {
    let config = one_year(100.0, 24);
    let table = career_table(&config).unwrap();
    let t = run_career(&config, &table, &mut SeededDraw::new(1)).unwrap();
    assert_eq!(t.insolvent_months, 12);
    assert_eq!(t.sessions_played, 0);
    assert!(t.bankroll.iter().all(|&b| b == 100.0));
    assert_eq!(t.events_of(EventKind::Insolvent).count(), 12);
}

#[test]
fn contributions_stop_at_holiday_ceiling() {
    let config = CareerConfig {
        insolvency_floor: 0.0,
        contribution: Some(ContributionRule {
            after_win: 100.0,
            after_loss: 50.0,
            holiday_ceiling: 1200.0,
        }),
        ..one_year(1000.0, 0)
    };
    let table = career_table(&config).unwrap();
    let t = run_career(&config, &table, &mut SeededDraw::new(1)).unwrap();
    assert_relative_eq!(t.contributed, 200.0);
    assert_relative_eq!(t.final_bankroll(), 1200.0);
    assert_eq!(t.events_of(EventKind::Contribution).count(), 4);
    assert_eq!(t.events_of(EventKind::Holiday).count(), 8);
}

#[test]
fn tax_on_previous_month_winnings() {
    let config = CareerConfig {
        tax: Some(TaxRule {
            threshold: 50.0,
            rate: 0.2,
        }),
        ..one_year(1000.0, 12)
    };
    let table = career_table(&config).unwrap();
    // every hand banker: each session is 11 wins for +104.5
    let mut draws = ScriptedDraw::baccarat(&[BaccaratOutcome::Banker]);
    let t = run_career(&config, &table, &mut draws).unwrap();

    let taxes: Vec<_> = t.events_of(EventKind::Tax).collect();
    assert_eq!(taxes.len(), 11);
    assert_eq!(taxes[0].month, 1);
    assert_relative_eq!(taxes[0].amount, 10.9, epsilon = 1e-9);
    assert_relative_eq!(t.tax_paid, 119.9, epsilon = 1e-6);
    assert_relative_eq!(t.bankroll[0], 1104.5, epsilon = 1e-9);
}

#[test]
fn recovery_sessions_chain_then_fall_back() {
    let config = CareerConfig {
        legs: vec![CareerLeg {
            name: "recovery".to_string(),
            overrides: StrategyOverrides {
                recovery: RecoveryConfig {
                    enabled: true,
                    target_units: 10.0,
                    stop_loss_units: 5.0,
                    max_chain: 2,
                },
                ..Default::default()
            },
            target_bankroll: None,
        }],
        ..one_year(1000.0, 48)
    };
    let table = career_table(&config).unwrap();
    let mut draws = ScriptedDraw::baccarat(&[BaccaratOutcome::Player]);
    let t = run_career(&config, &table, &mut draws).unwrap();
    // -100 standard, -50 and -50 recovery, -100 standard again
    assert_relative_eq!(t.bankroll[0], 700.0);
}

fn losing_leg(name: &str, target_bankroll: Option<f64>) -> CareerLeg {
    CareerLeg {
        name: name.to_string(),
        overrides: StrategyOverrides::default(),
        target_bankroll,
    }
}

#[test]
fn sticky_tier_holds_within_leg() {
    // 2050 opens tier 2 (base 20, stop loss 200); 1850 is still inside its slack
    let run = |tier_mode: TierMode| {
        let config = CareerConfig {
            tier_mode,
            ..one_year(2050.0, 24)
        };
        let table = career_table(&config).unwrap();
        let mut draws = ScriptedDraw::baccarat(&[BaccaratOutcome::Player]);
        run_career(&config, &table, &mut draws).unwrap()
    };
    let sticky = run(TierMode::Sticky);
    let reactive = run(TierMode::Reactive);
    assert_relative_eq!(sticky.bankroll[0], 1650.0);
    assert_relative_eq!(reactive.bankroll[0], 1750.0);
}

#[test]
fn sticky_tier_resets_on_promotion() {
    let config = CareerConfig {
        tier_mode: TierMode::Sticky,
        legs: vec![losing_leg("opener", Some(0.0)), losing_leg("closer", None)],
        ..one_year(2050.0, 12)
    };
    let table = career_table(&config).unwrap();
    let mut draws = ScriptedDraw::baccarat(&[BaccaratOutcome::Player]);
    let t = run_career(&config, &table, &mut draws).unwrap();
    assert_eq!(t.leg_by_month[1], 1);
    // month 0 loses 200 at tier 2, month 1 starts the new leg at tier 1
    assert_relative_eq!(t.bankroll[0], 1850.0);
    assert_relative_eq!(t.bankroll[1], 1750.0);
}

#[test]
fn empty_career_rejected() {
    let config = CareerConfig {
        legs: Vec::new(),
        ..Default::default()
    };
    let table = career_table(&CareerConfig::default()).unwrap();
    assert!(run_career(&config, &table, &mut SeededDraw::new(1)).is_err());
}
