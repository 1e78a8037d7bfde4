//! Per-session mutable state and the update rule applied after every
//! resolved hand or spin.
//!
//! `SessionRules` is the read-only half: overrides resolved against a tier
//! once, at session construction. `SessionState` is owned by the session
//! loop and never escapes it.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::outcome::BetResult;
use crate::progression::Progression;
use crate::strategy::{StrategyOverrides, TieBetMode};
use crate::tiers::TierConfig;
use crate::wager::{Side, Wager};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// How the career driver wants the next session played.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SessionPlan {
    #[default]
    Standard,
    /// Previous session lost `last_loss` (positive amount).
    Recovery { last_loss: f64 },
}

#[derive(Debug, Clone)]
pub struct SessionRules {
    pub overrides: StrategyOverrides,
    pub tier_level: u32,
    pub base_unit: f64,
    pub press_unit: f64,
    pub start_bankroll: f64,
    /// Loss (positive currency) that ends the session. None = disabled.
    pub stop_loss: Option<f64>,
    /// Profit that ends the session. None = disabled.
    pub profit_target: Option<f64>,
    /// Table maximum for a single main stake. None = no cap.
    pub max_bet: Option<f64>,
    pub progression: Progression,
}

fn threshold(units: Option<f64>, base_unit: f64, tier_default: f64) -> Option<f64> {
    let amount = match units {
        Some(u) => u * base_unit,
        None => tier_default,
    };
    (amount > 0.0).then_some(amount)
}

impl SessionRules {
    pub fn new(
        overrides: &StrategyOverrides,
        tier: &TierConfig,
        bankroll: f64,
        plan: SessionPlan,
    ) -> SimResult<Self> {
        overrides.validate()?;
        if tier.base_unit <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "tier {} has non-positive base unit",
                tier.level
            )));
        }
        if !bankroll.is_finite() || bankroll < 0.0 {
            return Err(SimError::InvalidValue(format!("bankroll {}", bankroll)));
        }
        let base = tier.base_unit;

        let mut stop_loss = threshold(overrides.stop_loss_units, base, tier.stop_loss);
        let mut profit_target = threshold(overrides.profit_lock_units, base, tier.profit_lock);
        if let SessionPlan::Recovery { last_loss } = plan {
            let r = &overrides.recovery;
            if r.enabled {
                let target = last_loss.abs().min(r.target_units * base);
                profit_target = (target > 0.0).then_some(target);
                stop_loss = threshold(Some(r.stop_loss_units), base, tier.stop_loss);
            }
        }

        Ok(SessionRules {
            overrides: overrides.clone(),
            tier_level: tier.level,
            base_unit: base,
            press_unit: tier.press_unit,
            start_bankroll: bankroll,
            stop_loss,
            profit_target,
            max_bet: (tier.catastrophic_cap > 0.0).then_some(tier.catastrophic_cap),
            progression: Progression {
                mode: overrides.press_mode,
                base_unit: base,
                press_unit: tier.press_unit,
                press_trigger: overrides.press_trigger,
                press_depth: overrides.press_depth,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TieStats {
    pub ties: u32,
    pub bets_placed: u32,
    pub bet_pnl: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SideBetStats {
    pub placed: u32,
    pub hits: u32,
    pub pnl: f64,
}

impl SideBetStats {
    pub fn record(&mut self, result: &BetResult) {
        self.placed += 1;
        if result.won() {
            self.hits += 1;
        }
        self.pnl += result.pnl;
    }
}

/// Which of the two dual bets is running its negative progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DualSlot {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DualState {
    /// None = both bets live at level 0.
    pub progressing: Option<DualSlot>,
    pub level: usize,
    pub forced_resets: u32,
}

impl DualState {
    fn reset(&mut self) {
        self.progressing = None;
        self.level = 0;
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SessionState {
    pub pnl: f64,
    pub peak_pnl: f64,
    pub volume: f64,
    pub hands_played: u32,
    pub segment: u32,
    pub hand_in_segment: u32,
    pub segment_pnl: Vec<f64>,

    pub consecutive_wins: u32,
    pub consecutive_losses: u32,
    pub press_streak: u32,
    pub level: usize,
    pub max_level_reached: usize,

    pub locked_floor: Option<f64>,
    /// Peak used by the ratchet ladder; re-based while grinding.
    pub ratchet_peak: f64,

    pub virtual_mode: bool,
    pub virtual_losses: u32,
    pub virtual_hands: u32,
    pub iron_gate_trips: u32,
    pub reentry_remaining: u32,

    pub last_winner: Option<Side>,
    pub current_target: Option<Wager>,

    pub tie_bet_next: bool,
    pub ties: TieStats,
    pub spice: SideBetStats,
    pub dual: DualState,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState {
            pnl: 0.0,
            peak_pnl: 0.0,
            volume: 0.0,
            hands_played: 0,
            segment: 0,
            hand_in_segment: 0,
            segment_pnl: vec![0.0],
            consecutive_wins: 0,
            consecutive_losses: 0,
            press_streak: 0,
            level: 0,
            max_level_reached: 0,
            locked_floor: None,
            ratchet_peak: 0.0,
            virtual_mode: false,
            virtual_losses: 0,
            virtual_hands: 0,
            iron_gate_trips: 0,
            reentry_remaining: 0,
            last_winner: None,
            current_target: None,
            tie_bet_next: false,
            ties: TieStats::default(),
            spice: SideBetStats::default(),
            dual: DualState::default(),
        }
    }

    pub fn available_bankroll(&self, rules: &SessionRules) -> f64 {
        rules.start_bankroll + self.pnl
    }

    /// Early segments during which the ratchet and profit target are waived.
    pub fn is_grinding(&self, rules: &SessionRules) -> bool {
        rules.overrides.ratchet.is_enabled() && self.segment < rules.overrides.ratchet_grind_segments
    }

    /// Raise the locked floor to the highest rung the ratchet peak unlocks.
    /// Never lowers it.
    pub fn raise_floor(&mut self, rules: &SessionRules) {
        if self.is_grinding(rules) {
            return;
        }
        let ratchet = rules.overrides.ratchet;
        if let Some(floor) = ratchet.floor_for_peak(self.ratchet_peak, rules.base_unit) {
            self.locked_floor = Some(self.locked_floor.map_or(floor, |f| f.max(floor)));
        }
    }

    /// Trip the iron gate: stop staking real money and observe.
    pub fn enter_virtual(&mut self) {
        self.virtual_mode = true;
        self.virtual_losses = 0;
        self.iron_gate_trips += 1;
        self.consecutive_losses = 0;
        self.consecutive_wins = 0;
        self.press_streak = 0;
        self.level = 0;
        self.dual.reset();
    }

    /// Segment bookkeeping before the next hand is decided.
    pub fn begin_hand(&mut self, rules: &SessionRules) {
        let segment_len = rules.overrides.segment_length();
        if self.hands_played > 0 && self.hand_in_segment >= segment_len {
            self.segment += 1;
            self.hand_in_segment = 0;
            self.segment_pnl.push(0.0);
            self.consecutive_wins = 0;
            self.consecutive_losses = 0;
            self.press_streak = 0;
            self.last_winner = None;
            self.current_target = None;
            self.tie_bet_next = false;
        }
        if self.is_grinding(rules) {
            self.ratchet_peak = self.pnl;
            self.locked_floor = None;
        }
    }

    /// Apply one resolved hand.
    ///
    /// `pnl` is the real money result (0 for virtual hands), `won` the net
    /// classification, `was_tie` a baccarat tie, and `side` the winning side
    /// if any. Ties and zero-net real hands leave streaks alone; only ties
    /// are counted. Loss streaks are counted here; `decide` trips the gate.
    pub fn apply(
        &mut self,
        rules: &SessionRules,
        won: bool,
        pnl: f64,
        was_tie: bool,
        side: Option<Side>,
    ) {
        self.pnl += pnl;
        if let Some(bucket) = self.segment_pnl.last_mut() {
            *bucket += pnl;
        }
        self.hands_played += 1;
        self.hand_in_segment += 1;

        self.peak_pnl = self.peak_pnl.max(self.pnl);
        if self.is_grinding(rules) {
            self.ratchet_peak = self.pnl;
        } else {
            self.ratchet_peak = self.ratchet_peak.max(self.pnl);
            self.raise_floor(rules);
        }

        if side.is_some() {
            self.last_winner = side;
        }

        if self.virtual_mode {
            self.virtual_hands += 1;
            if was_tie {
                self.ties.ties += 1;
            } else if won {
                self.virtual_mode = false;
                self.consecutive_losses = 0;
                self.consecutive_wins = 0;
                self.press_streak = 0;
                self.reentry_remaining = rules.overrides.reentry_flat_hands;
            } else {
                self.virtual_losses += 1;
            }
            return;
        }

        if was_tie {
            self.ties.ties += 1;
            self.tie_bet_next = rules.overrides.tie_bet.mode == TieBetMode::AfterTie;
            return;
        }
        self.tie_bet_next = false;
        // zero-net push: streaks and levels hold
        if !won && pnl == 0.0 {
            return;
        }

        let dual = rules.overrides.is_dual_bet();
        if won {
            self.consecutive_losses = 0;
            self.consecutive_wins += 1;
            let depth = rules.overrides.press_depth;
            self.press_streak = if depth == 0 {
                self.press_streak + 1
            } else {
                (self.press_streak + 1).min(depth)
            };
            self.reentry_remaining = self.reentry_remaining.saturating_sub(1);
            if !dual {
                self.level = rules.progression.after_win(self.level);
            }
        } else {
            self.consecutive_wins = 0;
            self.press_streak = 0;
            self.consecutive_losses += 1;
            if !dual {
                self.level = rules.progression.after_loss(self.level, self.pnl);
            }
        }
        self.max_level_reached = self.max_level_reached.max(self.level);
    }

    /// Advance the dual-bet halting progression from per-bet results.
    /// Called before `apply` for the same hand.
    ///
    /// While both bets are live, the first one to lose starts progressing
    /// (primary wins the tie-break when both lose) and the other is
    /// suspended. A win by the progressing bet, or a loss at its top level,
    /// resets both.
    pub fn apply_dual(
        &mut self,
        rules: &SessionRules,
        primary: Option<&BetResult>,
        secondary: Option<&BetResult>,
        hand_pnl: f64,
    ) -> SimResult<()> {
        let mode = rules.progression.mode;
        match self.dual.progressing {
            None => {
                let lost = |b: Option<&BetResult>| b.map_or(false, |r| r.stake > 0.0 && r.pnl < 0.0);
                if lost(primary) {
                    self.dual.progressing = Some(DualSlot::Primary);
                    self.dual.level = 1;
                } else if lost(secondary) {
                    self.dual.progressing = Some(DualSlot::Secondary);
                    self.dual.level = 1;
                }
            }
            Some(slot) => {
                let bet = match slot {
                    DualSlot::Primary => primary,
                    DualSlot::Secondary => secondary,
                }
                .ok_or_else(|| {
                    SimError::InvariantViolation(format!(
                        "{:?} bet is progressing but was not resolved",
                        slot
                    ))
                })?;
                if bet.stake <= 0.0 {
                    return Err(SimError::InvariantViolation(format!(
                        "{:?} bet is progressing with zero stake",
                        slot
                    )));
                }
                if bet.pnl > 0.0 {
                    self.dual.reset();
                } else if bet.pnl < 0.0 {
                    if self.dual.level >= mode.level_cap(self.pnl + hand_pnl) {
                        self.dual.reset();
                        self.dual.forced_resets += 1;
                    } else {
                        self.dual.level += 1;
                    }
                }
            }
        }
        self.max_level_reached = self.max_level_reached.max(self.dual.level);
        Ok(())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
