use approx::assert_relative_eq;
use strategy_sim::error::SimError;
use strategy_sim::outcome::{
    resolve, wager_pnl, BaccaratOutcome, BetRole, Draw, HandResult, Stake, BANKER_PROB,
    PLAYER_PROB, TIE_PROB,
};
use strategy_sim::rng::{DrawSource, SeededDraw};
use strategy_sim::wager::{BetPattern, Game, OutsideBet, SpiceBet, Wager};

fn bac(o: BaccaratOutcome) -> Draw {
    Draw::Baccarat(o)
}

#[test]
fn banker_pays_commission() {
    let r = resolve(&[Stake::new(Wager::Banker, 10.0, BetRole::Main)], bac(BaccaratOutcome::Banker)).unwrap();
    assert_relative_eq!(r.pnl, 9.5);
    assert_eq!(r.result, HandResult::Win);
    assert!(r.won());

    let r = resolve(&[Stake::new(Wager::Player, 10.0, BetRole::Main)], bac(BaccaratOutcome::Banker)).unwrap();
    assert_relative_eq!(r.pnl, -10.0);
    assert_eq!(r.result, HandResult::Loss);
}

#[test]
fn tie_pushes_main_and_pays_side() {
    let stakes = [
        Stake::new(Wager::Banker, 10.0, BetRole::Main),
        Stake::new(Wager::Tie, 5.0, BetRole::Side),
    ];
    let r = resolve(&stakes, bac(BaccaratOutcome::Tie)).unwrap();
    assert_eq!(r.result, HandResult::Push);
    assert!(r.was_tie);
    assert_eq!(r.side, None);
    assert_relative_eq!(r.bet(BetRole::Main).unwrap().pnl, 0.0);
    assert_relative_eq!(r.bet(BetRole::Side).unwrap().pnl, 40.0);
    assert_relative_eq!(r.pnl, 40.0);
    assert_relative_eq!(r.volume(), 15.0);
}

#[test]
fn hedged_outside_bets_push() {
    let stakes = [
        Stake::new(Wager::Outside(OutsideBet::Red), 10.0, BetRole::Main),
        Stake::new(Wager::Outside(OutsideBet::Black), 10.0, BetRole::Secondary),
    ];
    let r = resolve(&stakes, Draw::Roulette(5)).unwrap();
    assert_eq!(r.result, HandResult::Push);
    assert!(!r.was_tie);
    let r = resolve(&stakes, Draw::Roulette(0)).unwrap();
    assert_relative_eq!(r.pnl, -10.0);
    assert_eq!(r.result, HandResult::Loss);
}

#[test]
fn dozen_and_column_pay_two_to_one() {
    let pnl = wager_pnl(Wager::Outside(OutsideBet::Dozen(3)), 10.0, Draw::Roulette(30)).unwrap();
    assert_relative_eq!(pnl, 20.0);
    let pnl = wager_pnl(Wager::Outside(OutsideBet::Column(2)), 10.0, Draw::Roulette(29)).unwrap();
    assert_relative_eq!(pnl, 20.0);
    let pnl = wager_pnl(Wager::Outside(OutsideBet::Low), 10.0, Draw::Roulette(19)).unwrap();
    assert_relative_eq!(pnl, -10.0);
}

#[test]
fn james_bond_legs() {
    let bond = Wager::Pattern(BetPattern::JamesBond);
    assert_relative_eq!(wager_pnl(bond, 20.0, Draw::Roulette(0)).unwrap(), 16.0);
    assert_relative_eq!(wager_pnl(bond, 20.0, Draw::Roulette(20)).unwrap(), 8.0);
    assert_relative_eq!(wager_pnl(bond, 20.0, Draw::Roulette(15)).unwrap(), 10.0);
    assert_relative_eq!(wager_pnl(bond, 20.0, Draw::Roulette(5)).unwrap(), -20.0);
}

#[test]
fn two_dozens_split_stake() {
    let two = Wager::Pattern(BetPattern::TwoDozens);
    assert_relative_eq!(wager_pnl(two, 20.0, Draw::Roulette(5)).unwrap(), 10.0);
    assert_relative_eq!(wager_pnl(two, 20.0, Draw::Roulette(30)).unwrap(), -20.0);
}

#[test]
fn jeu_zero_straight_up() {
    let jeu = Wager::Spice(SpiceBet::JeuZero);
    assert_relative_eq!(wager_pnl(jeu, 4.0, Draw::Roulette(26)).unwrap(), 32.0);
    assert_relative_eq!(wager_pnl(jeu, 4.0, Draw::Roulette(0)).unwrap(), 14.0);
    assert_relative_eq!(wager_pnl(jeu, 4.0, Draw::Roulette(1)).unwrap(), -4.0);
}

#[test]
fn negative_stake_rejected() {
    let r = resolve(&[Stake::new(Wager::Banker, -1.0, BetRole::Main)], bac(BaccaratOutcome::Banker));
    assert!(matches!(r, Err(SimError::InvariantViolation(_))));
}

#[test]
fn seeded_baccarat_frequencies() {
    let mut source = SeededDraw::new(9);
    let n = 200_000;
    let mut counts = [0usize; 3];
    for _ in 0..n {
        match Draw::from_unit(Game::Baccarat, source.next_unit()) {
            Draw::Baccarat(BaccaratOutcome::Banker) => counts[0] += 1,
            Draw::Baccarat(BaccaratOutcome::Player) => counts[1] += 1,
            _ => counts[2] += 1,
        }
    }
    let f = |c: usize| c as f64 / n as f64;
    assert_relative_eq!(f(counts[0]), BANKER_PROB, epsilon = 0.01);
    assert_relative_eq!(f(counts[1]), PLAYER_PROB, epsilon = 0.01);
    assert_relative_eq!(f(counts[2]), TIE_PROB, epsilon = 0.01);
}
