use strategy_sim::error::SimError;
use strategy_sim::tiers::{tier_for_bankroll, TierMode, TierParams, TierTable};

fn table() -> TierTable {
    TierTable::generate(&TierParams::default()).unwrap()
}

#[test]
fn reactive_lookup_follows_bankroll() {
    let t = table();
    assert_eq!(tier_for_bankroll(0.0, &t, None, TierMode::Reactive).unwrap().level, 1);
    assert_eq!(tier_for_bankroll(1999.0, &t, None, TierMode::Reactive).unwrap().level, 1);
    assert_eq!(tier_for_bankroll(2000.0, &t, None, TierMode::Reactive).unwrap().level, 2);
    assert_eq!(tier_for_bankroll(3000.0, &t, None, TierMode::Reactive).unwrap().level, 3);
    assert_eq!(tier_for_bankroll(1e12, &t, None, TierMode::Reactive).unwrap().level, 10);
    // below the table clamps to the first tier
    assert_eq!(tier_for_bankroll(-50.0, &t, None, TierMode::Reactive).unwrap().level, 1);
}

#[test]
fn base_unit_non_decreasing() {
    let t = table();
    let units: Vec<f64> = t.tiers().iter().map(|c| c.base_unit).collect();
    assert!(units.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(t.by_level(3).unwrap().base_unit, 30.0);
    assert_eq!(t.by_level(3).unwrap().stop_loss, 300.0);
}

#[test]
fn sticky_climbs_immediately() {
    let t = table();
    let tier = tier_for_bankroll(3100.0, &t, Some(2), TierMode::Sticky).unwrap();
    assert_eq!(tier.level, 3);
}

#[test]
fn sticky_without_history_is_reactive() {
    let t = table();
    let tier = tier_for_bankroll(2500.0, &t, None, TierMode::Sticky).unwrap();
    assert_eq!(tier.level, 2);
}

#[test]
fn non_finite_bankroll_rejected() {
    let t = table();
    assert!(matches!(
        tier_for_bankroll(f64::NAN, &t, None, TierMode::Reactive),
        Err(SimError::InvalidValue(_))
    ));
}

#[test]
fn empty_table_rejected() {
    assert!(TierTable::new(Vec::new()).is_err());
    let params = TierParams {
        levels: 0,
        ..Default::default()
    };
    assert!(TierTable::generate(&params).is_err());
}
