//! One simulated session: decide → draw → resolve → apply, until a stop
//! decision or the hand/spin cap.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::decision::{decide, ExitReason, Mode};
use crate::error::SimResult;
use crate::outcome::{resolve, BetRole, Draw, HandResult, Stake};
use crate::rng::DrawSource;
use crate::state::{SessionPlan, SessionRules, SessionState, SideBetStats, TieStats};
use crate::strategy::StrategyOverrides;
use crate::tiers::TierConfig;
use crate::wager::Wager;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub pnl: f64,
    /// Sum of absolute stakes placed with real money.
    pub volume: f64,
    pub tier_level: u32,
    pub hands_played: u32,
    pub exit: ExitReason,
    pub max_level_reached: usize,
    pub iron_gate_trips: u32,
    pub virtual_hands: u32,
    pub forced_resets: u32,
    pub ties: TieStats,
    pub spice: SideBetStats,
    /// P&L per shoe (baccarat) or for the whole session (roulette).
    pub segment_pnl: Vec<f64>,
}

impl SessionSummary {
    pub fn won(&self) -> bool {
        self.pnl > 0.0
    }
}

/// Hand-level record, for callers that want the full trace.
#[derive(Debug, Clone, PartialEq)]
pub struct HandRecord {
    pub hand: u32,
    pub target: Wager,
    pub amount: f64,
    pub draw: Draw,
    pub pnl: f64,
    pub result: HandResult,
    pub virtual_hand: bool,
    pub level: usize,
}

/// Run one session at `bankroll` on `tier`.
pub fn run_session(
    overrides: &StrategyOverrides,
    tier: &TierConfig,
    bankroll: f64,
    plan: SessionPlan,
    source: &mut dyn DrawSource,
) -> SimResult<SessionSummary> {
    run_session_traced(overrides, tier, bankroll, plan, source, |_| {})
}

/// Like `run_session`, calling `on_hand` after every resolved hand.
pub fn run_session_traced<F>(
    overrides: &StrategyOverrides,
    tier: &TierConfig,
    bankroll: f64,
    plan: SessionPlan,
    source: &mut dyn DrawSource,
    mut on_hand: F,
) -> SimResult<SessionSummary>
where
    F: FnMut(&HandRecord),
{
    let rules = SessionRules::new(overrides, tier, bankroll, plan)?;
    let mut state = SessionState::new();
    let cap = overrides.session_length();
    let game = overrides.game;

    let exit = loop {
        if state.hands_played < cap {
            state.begin_hand(&rules);
        }
        let level_before = state.level.max(state.dual.level);
        let decision = decide(&mut state, &rules);
        if decision.mode == Mode::Stopped {
            break decision.exit_reason().unwrap_or(ExitReason::SessionComplete);
        }
        if state.hands_played >= cap {
            break ExitReason::SessionComplete;
        }

        let draw = Draw::sample(game, source);
        let hand = state.hands_played + 1;

        let (pnl, result) = if decision.is_virtual() {
            let notional = [Stake::new(decision.target, rules.base_unit, BetRole::Main)];
            let res = resolve(&notional, draw)?;
            state.apply(&rules, res.won(), 0.0, res.was_tie, res.side);
            (0.0, res.result)
        } else {
            let res = resolve(&decision.stakes(), draw)?;
            state.volume += res.volume();
            if let Some(side) = res.bet(BetRole::Side) {
                match side.wager {
                    Wager::Tie => {
                        state.ties.bets_placed += 1;
                        state.ties.bet_pnl += side.pnl;
                    }
                    _ => state.spice.record(side),
                }
            }
            if overrides.is_dual_bet() {
                state.apply_dual(
                    &rules,
                    res.bet(BetRole::Main),
                    res.bet(BetRole::Secondary),
                    res.pnl,
                )?;
            }
            state.apply(&rules, res.won(), res.pnl, res.was_tie, res.side);
            (res.pnl, res.result)
        };

        trace!(
            hand,
            draw = %draw,
            target = %decision.target,
            amount = decision.amount,
            pnl,
            reason = %decision.reason,
            "hand resolved"
        );
        on_hand(&HandRecord {
            hand,
            target: decision.target,
            amount: decision.amount,
            draw,
            pnl,
            result,
            virtual_hand: decision.is_virtual(),
            level: level_before,
        });
    };

    debug!(
        strategy = %overrides.name,
        tier = rules.tier_level,
        pnl = state.pnl,
        hands = state.hands_played,
        exit = %exit,
        "session finished"
    );

    Ok(SessionSummary {
        pnl: state.pnl,
        volume: state.volume,
        tier_level: rules.tier_level,
        hands_played: state.hands_played,
        exit,
        max_level_reached: state.max_level_reached,
        iron_gate_trips: state.iron_gate_trips,
        virtual_hands: state.virtual_hands,
        forced_resets: state.dual.forced_resets,
        ties: state.ties,
        spice: state.spice,
        segment_pnl: state.segment_pnl,
    })
}
