//! Next-bet decisions.
//!
//! `decide` walks a fixed rule order and returns on the first match:
//! observing → stop loss → profit target → ratchet / color up / smart exit
//! → iron gate → sizing. The only state it touches are gate crossings
//! (entering observation, locking the ratchet floor) and the carried
//! follow-the-winner target; everything else moves in `SessionState::apply`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::outcome::{BetRole, Stake};
use crate::progression::PressMode;
use crate::state::{DualSlot, SessionRules, SessionState};
use crate::strategy::{TargetSelector, TieBetMode};
use crate::wager::{Game, Side, Wager};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    ProfitTarget,
    Ratchet,
    SmartExit,
    Survival,
    ColorUp,
    SessionComplete,
}

impl ExitReason {
    pub const ALL: [ExitReason; 7] = [
        ExitReason::StopLoss,
        ExitReason::ProfitTarget,
        ExitReason::Ratchet,
        ExitReason::SmartExit,
        ExitReason::Survival,
        ExitReason::ColorUp,
        ExitReason::SessionComplete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::StopLoss => "stop loss",
            ExitReason::ProfitTarget => "target",
            ExitReason::Ratchet => "ratchet",
            ExitReason::SmartExit => "smart exit",
            ExitReason::Survival => "survival",
            ExitReason::ColorUp => "color up",
            ExitReason::SessionComplete => "session complete",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Playing,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Stop(ExitReason),
    /// Observing after an iron-gate trip.
    Virtual,
    /// The iron gate tripped on this decision.
    IronGate,
    /// Flat re-entry after observing.
    Reentry,
    Flat,
    Press,
    Progression,
    /// Dual bet with one side suspended.
    Halted,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Stop(exit) => write!(f, "{}", exit),
            Reason::Virtual => write!(f, "virtual"),
            Reason::IronGate => write!(f, "iron gate"),
            Reason::Reentry => write!(f, "re-entry"),
            Reason::Flat => write!(f, "flat"),
            Reason::Press => write!(f, "press"),
            Reason::Progression => write!(f, "progression"),
            Reason::Halted => write!(f, "halted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub mode: Mode,
    pub target: Wager,
    pub amount: f64,
    pub secondary: Option<Stake>,
    pub side_bet: Option<Stake>,
    pub reason: Reason,
}

impl Decision {
    fn stopped(target: Wager, exit: ExitReason) -> Self {
        Decision {
            mode: Mode::Stopped,
            target,
            amount: 0.0,
            secondary: None,
            side_bet: None,
            reason: Reason::Stop(exit),
        }
    }

    fn observing(target: Wager, reason: Reason) -> Self {
        Decision {
            mode: Mode::Playing,
            target,
            amount: 0.0,
            secondary: None,
            side_bet: None,
            reason,
        }
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        match self.reason {
            Reason::Stop(exit) => Some(exit),
            _ => None,
        }
    }

    /// Playing with no real money at risk.
    pub fn is_virtual(&self) -> bool {
        matches!(self.reason, Reason::Virtual | Reason::IronGate)
    }

    /// All stakes to resolve, main first.
    pub fn stakes(&self) -> Vec<Stake> {
        let mut stakes = vec![Stake::new(self.target, self.amount, BetRole::Main)];
        stakes.extend(self.secondary);
        stakes.extend(self.side_bet);
        stakes
    }

    pub fn total_stake(&self) -> f64 {
        self.stakes().iter().map(|s| s.amount).sum()
    }
}

fn default_side(game: Game) -> Side {
    match game {
        Game::Baccarat => Side::Banker,
        Game::Roulette => Side::Red,
    }
}

/// Pick the main wager. Follow-the-winner keeps the previous pick while a
/// win or loss progression is running.
fn select_target(state: &mut SessionState, rules: &SessionRules) -> Wager {
    match rules.overrides.target {
        TargetSelector::Fixed(wager) => wager,
        TargetSelector::FollowWinner => {
            let fallback = default_side(rules.overrides.game).wager();
            let running = rules.progression.is_active(
                state.level,
                state.press_streak,
                state.consecutive_losses,
            );
            let chosen = if running {
                state.current_target.unwrap_or(fallback)
            } else {
                state.last_winner.map(Side::wager).unwrap_or(fallback)
            };
            state.current_target = Some(chosen);
            chosen
        }
    }
}

fn cap(amount: f64, rules: &SessionRules) -> f64 {
    match rules.max_bet {
        Some(max) => amount.min(max),
        None => amount,
    }
}

/// Decide the next bet.
pub fn decide(state: &mut SessionState, rules: &SessionRules) -> Decision {
    let target = select_target(state, rules);
    let o = &rules.overrides;
    let base = rules.base_unit;
    let grinding = state.is_grinding(rules);

    if state.virtual_mode {
        return Decision::observing(target, Reason::Virtual);
    }

    if let Some(stop) = rules.stop_loss {
        if state.pnl <= -stop {
            return Decision::stopped(target, ExitReason::StopLoss);
        }
    }

    if let Some(goal) = rules.profit_target {
        if state.pnl >= goal && !grinding {
            return Decision::stopped(target, ExitReason::ProfitTarget);
        }
    }

    if o.ratchet.is_enabled() && !grinding {
        if let Some(cap_units) = o.ratchet.hard_cap() {
            if state.pnl >= cap_units * base {
                return Decision::stopped(target, ExitReason::ColorUp);
            }
        }
        state.raise_floor(rules);
        if let Some(floor) = state.locked_floor {
            if state.pnl <= floor {
                return Decision::stopped(target, ExitReason::Ratchet);
            }
        }
    }

    if o.smart_exit.enabled
        && state.peak_pnl >= o.smart_exit.activation_units * base
        && state.pnl <= state.peak_pnl - o.smart_exit.trailing_units * base
    {
        return Decision::stopped(target, ExitReason::SmartExit);
    }

    if o.iron_gate_limit > 0 && state.consecutive_losses >= o.iron_gate_limit {
        state.enter_virtual();
        return Decision::observing(target, Reason::IronGate);
    }

    let (amount, secondary, reason) = size_main(state, rules);
    let amount = cap(amount, rules);
    let secondary = secondary.map(|s| Stake {
        amount: cap(s.amount, rules),
        ..s
    });

    let side_bet = match o.game {
        Game::Baccarat => {
            let place = match o.tie_bet.mode {
                TieBetMode::Off => false,
                TieBetMode::Always => true,
                TieBetMode::AfterTie => state.tie_bet_next,
            };
            (place && o.tie_bet.units > 0.0)
                .then(|| Stake::new(Wager::Tie, o.tie_bet.units * base, BetRole::Side))
        }
        Game::Roulette => o
            .spice
            .filter(|s| s.units > 0.0)
            .map(|s| Stake::new(Wager::Spice(s.bet), s.units * base, BetRole::Side)),
    };

    let decision = Decision {
        mode: Mode::Playing,
        target,
        amount,
        secondary,
        side_bet,
        reason,
    };
    if decision.total_stake() > state.available_bankroll(rules) {
        return Decision::stopped(target, ExitReason::Survival);
    }
    decision
}

fn size_main(state: &SessionState, rules: &SessionRules) -> (f64, Option<Stake>, Reason) {
    let o = &rules.overrides;
    let base = rules.base_unit;
    let prog = &rules.progression;

    if let Some(secondary) = o.secondary {
        let unit = prog.sequence_at(0) * base;
        if state.reentry_remaining > 0 {
            return (
                unit,
                Some(Stake::new(secondary, unit, BetRole::Secondary)),
                Reason::Reentry,
            );
        }
        let idx = state.dual.level.min(prog.mode.level_cap(state.pnl));
        let pressed = prog.sequence_at(idx) * base;
        return match state.dual.progressing {
            None => (
                unit,
                Some(Stake::new(secondary, unit, BetRole::Secondary)),
                Reason::Flat,
            ),
            Some(DualSlot::Primary) => (
                pressed,
                Some(Stake::new(secondary, 0.0, BetRole::Secondary)),
                Reason::Halted,
            ),
            Some(DualSlot::Secondary) => (
                0.0,
                Some(Stake::new(secondary, pressed, BetRole::Secondary)),
                Reason::Halted,
            ),
        };
    }

    if state.reentry_remaining > 0 {
        return (base, None, Reason::Reentry);
    }

    let amount = prog.stake(state.level, state.press_streak, state.pnl);
    let reason = match prog.mode {
        PressMode::Flat => Reason::Flat,
        PressMode::Standard | PressMode::Titan if amount > base => Reason::Press,
        PressMode::Standard | PressMode::Titan => Reason::Flat,
        _ => Reason::Progression,
    };
    (amount, None, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionPlan;
    use crate::strategy::StrategyOverrides;
    use crate::tiers::TierConfig;

    fn tier(cap: f64) -> TierConfig {
        TierConfig {
            level: 1,
            min_bankroll: 0.0,
            max_bankroll: f64::MAX,
            base_unit: 10.0,
            press_unit: 10.0,
            stop_loss: 100.0,
            profit_lock: 100.0,
            catastrophic_cap: cap,
        }
    }

    fn rules(o: StrategyOverrides, bankroll: f64, cap: f64) -> SessionRules {
        SessionRules::new(&o, &tier(cap), bankroll, SessionPlan::Standard).unwrap()
    }

    #[test]
    fn flat_bets_base_unit() {
        let r = rules(StrategyOverrides::default(), 2000.0, 0.0);
        let mut s = SessionState::new();
        let d = decide(&mut s, &r);
        assert_eq!(d.mode, Mode::Playing);
        assert_eq!(d.target, Wager::Banker);
        assert_eq!(d.amount, 10.0);
        assert_eq!(d.reason, Reason::Flat);
    }

    #[test]
    fn stopped_has_zero_stake() {
        let r = rules(StrategyOverrides::default(), 2000.0, 0.0);
        let mut s = SessionState::new();
        s.pnl = -100.0;
        let d = decide(&mut s, &r);
        assert_eq!(d.mode, Mode::Stopped);
        assert_eq!(d.amount, 0.0);
        assert_eq!(d.exit_reason(), Some(ExitReason::StopLoss));

        s.pnl = 100.0;
        let d = decide(&mut s, &r);
        assert_eq!(d.exit_reason(), Some(ExitReason::ProfitTarget));
        assert_eq!(d.total_stake(), 0.0);
    }

    #[test]
    fn zero_units_disable_thresholds() {
        let o = StrategyOverrides {
            stop_loss_units: Some(0.0),
            profit_lock_units: Some(0.0),
            ..Default::default()
        };
        let r = rules(o, 2000.0, 0.0);
        let mut s = SessionState::new();
        s.pnl = -500.0;
        assert_eq!(decide(&mut s, &r).mode, Mode::Playing);
        s.pnl = 500.0;
        assert_eq!(decide(&mut s, &r).mode, Mode::Playing);
    }

    #[test]
    fn virtual_mode_bets_nothing() {
        let r = rules(StrategyOverrides::default(), 2000.0, 0.0);
        let mut s = SessionState::new();
        s.virtual_mode = true;
        s.pnl = -500.0;
        let d = decide(&mut s, &r);
        assert_eq!(d.mode, Mode::Playing);
        assert_eq!(d.amount, 0.0);
        assert!(d.is_virtual());
    }

    #[test]
    fn iron_gate_trips_on_limit() {
        let o = StrategyOverrides {
            iron_gate_limit: 3,
            ..Default::default()
        };
        let r = rules(o, 2000.0, 0.0);
        let mut s = SessionState::new();
        s.consecutive_losses = 3;
        let d = decide(&mut s, &r);
        assert_eq!(d.reason, Reason::IronGate);
        assert_eq!(d.amount, 0.0);
        assert!(s.virtual_mode);
        assert_eq!(s.consecutive_losses, 0);
        assert_eq!(s.iron_gate_trips, 1);
    }

    #[test]
    fn losses_trip_the_gate_on_next_decision() {
        let o = StrategyOverrides {
            iron_gate_limit: 2,
            ..Default::default()
        };
        let r = rules(o, 2000.0, 0.0);
        let mut s = SessionState::new();
        s.apply(&r, false, -10.0, false, Some(Side::Player));
        s.apply(&r, false, -10.0, false, Some(Side::Player));
        assert!(!s.virtual_mode);

        let d = decide(&mut s, &r);
        assert_eq!(d.reason, Reason::IronGate);
        assert!(d.is_virtual());
        s.apply(&r, false, 0.0, false, Some(Side::Player));

        let d = decide(&mut s, &r);
        assert_eq!(d.reason, Reason::Virtual);
        assert_eq!(s.iron_gate_trips, 1);
    }

    #[test]
    fn reentry_bets_flat() {
        let o = StrategyOverrides {
            press_mode: PressMode::Titan,
            ..Default::default()
        };
        let r = rules(o, 2000.0, 0.0);
        let mut s = SessionState::new();
        s.press_streak = 2;
        s.reentry_remaining = 1;
        let d = decide(&mut s, &r);
        assert_eq!(d.amount, 10.0);
        assert_eq!(d.reason, Reason::Reentry);
    }

    #[test]
    fn table_cap_clamps_press() {
        let o = StrategyOverrides {
            press_mode: PressMode::Standard,
            ..Default::default()
        };
        let r = rules(o, 2000.0, 25.0);
        let mut s = SessionState::new();
        s.press_streak = 5;
        let d = decide(&mut s, &r);
        assert_eq!(d.amount, 25.0);
        assert_eq!(d.reason, Reason::Press);
    }

    #[test]
    fn survival_stop_when_broke() {
        let r = rules(StrategyOverrides::default(), 5.0, 0.0);
        let mut s = SessionState::new();
        let d = decide(&mut s, &r);
        assert_eq!(d.exit_reason(), Some(ExitReason::Survival));
    }

    #[test]
    fn ratchet_color_up() {
        let o = StrategyOverrides {
            ratchet: crate::strategy::RatchetMode::Tight,
            profit_lock_units: Some(0.0),
            ..Default::default()
        };
        let r = rules(o, 2000.0, 0.0);
        let mut s = SessionState::new();
        s.pnl = 150.0;
        s.ratchet_peak = 150.0;
        assert_eq!(decide(&mut s, &r).exit_reason(), Some(ExitReason::ColorUp));
    }

    #[test]
    fn smart_exit_trails_peak() {
        let o = StrategyOverrides {
            smart_exit: crate::strategy::SmartExit {
                enabled: true,
                activation_units: 6.0,
                trailing_units: 4.0,
            },
            ..Default::default()
        };
        let r = rules(o, 2000.0, 0.0);
        let mut s = SessionState::new();
        s.peak_pnl = 60.0;
        s.pnl = 30.0;
        assert_eq!(decide(&mut s, &r).mode, Mode::Playing);
        s.pnl = 20.0;
        assert_eq!(decide(&mut s, &r).exit_reason(), Some(ExitReason::SmartExit));
    }

    #[test]
    fn tie_bet_always_placed() {
        let o = StrategyOverrides {
            tie_bet: crate::strategy::TieBet {
                mode: TieBetMode::Always,
                units: 0.5,
            },
            ..Default::default()
        };
        let r = rules(o, 2000.0, 0.0);
        let mut s = SessionState::new();
        let d = decide(&mut s, &r);
        let side = d.side_bet.unwrap();
        assert_eq!(side.wager, Wager::Tie);
        assert_eq!(side.amount, 5.0);
        assert_eq!(d.total_stake(), 15.0);
    }
}
