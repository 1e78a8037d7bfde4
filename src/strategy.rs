//! Strategy overrides: the validated knobs for one
//! strategy. Missing JSON fields fall back to `Default`, never to ad hoc
//! defaults at decision time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::progression::PressMode;
use crate::wager::{Game, SpiceBet, Wager};

// ---------------------------------------------------------------------------
// Ratchet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatchetMode {
    #[default]
    Off,
    /// +8u → lock +3u, +12u → +5u, +16u → +7u, color up at +20u.
    Standard,
    /// +5u → lock +2u, +8u → +4u, +12u → +7u, color up at +15u.
    Tight,
}

const STANDARD_RUNGS: [(f64, f64); 3] = [(8.0, 3.0), (12.0, 5.0), (16.0, 7.0)];
const TIGHT_RUNGS: [(f64, f64); 3] = [(5.0, 2.0), (8.0, 4.0), (12.0, 7.0)];

impl RatchetMode {
    /// (peak threshold, locked floor) pairs in base units, ascending.
    pub fn rungs(self) -> &'static [(f64, f64)] {
        match self {
            RatchetMode::Off => &[],
            RatchetMode::Standard => &STANDARD_RUNGS,
            RatchetMode::Tight => &TIGHT_RUNGS,
        }
    }

    /// Peak (in base units) at which the session colors up.
    pub fn hard_cap(self) -> Option<f64> {
        match self {
            RatchetMode::Off => None,
            RatchetMode::Standard => Some(20.0),
            RatchetMode::Tight => Some(15.0),
        }
    }

    pub fn is_enabled(self) -> bool {
        self != RatchetMode::Off
    }

    /// Highest floor unlocked by `peak` (currency), if any.
    pub fn floor_for_peak(self, peak: f64, base_unit: f64) -> Option<f64> {
        self.rungs()
            .iter()
            .rev()
            .find(|(threshold, _)| peak >= threshold * base_unit)
            .map(|(_, lock)| lock * base_unit)
    }
}

// ---------------------------------------------------------------------------
// Targeting and side bets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSelector {
    Fixed(Wager),
    /// Bet the side that won the last non-tie (non-zero) hand.
    FollowWinner,
}

impl Default for TargetSelector {
    fn default() -> Self {
        TargetSelector::Fixed(Wager::Banker)
    }
}

impl fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSelector::Fixed(w) => write!(f, "{}", w),
            TargetSelector::FollowWinner => write!(f, "follow winner"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBetMode {
    #[default]
    Off,
    Always,
    /// Only on the hand right after a tie.
    AfterTie,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TieBet {
    pub mode: TieBetMode,
    pub units: f64,
}

impl Default for TieBet {
    fn default() -> Self {
        TieBet {
            mode: TieBetMode::Off,
            units: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiceSideBet {
    pub bet: SpiceBet,
    /// Stake per placement, in base units.
    pub units: f64,
}

// ---------------------------------------------------------------------------
// Recovery sessions and smart exit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    pub enabled: bool,
    /// Upper bound on the recovery target, in base units.
    pub target_units: f64,
    pub stop_loss_units: f64,
    /// Most consecutive recovery sessions before falling back.
    pub max_chain: u32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        RecoveryConfig {
            enabled: false,
            target_units: 10.0,
            stop_loss_units: 10.0,
            max_chain: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartExit {
    pub enabled: bool,
    /// Peak (base units) that arms the trailing stop.
    pub activation_units: f64,
    /// Give-back (base units) from the peak that triggers the exit.
    pub trailing_units: f64,
}

impl Default for SmartExit {
    fn default() -> Self {
        SmartExit {
            enabled: false,
            activation_units: 6.0,
            trailing_units: 4.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyOverrides {
    pub name: String,
    pub game: Game,
    /// None → tier default, Some(0) → disabled.
    pub stop_loss_units: Option<f64>,
    /// None → tier default, Some(0) → disabled.
    pub profit_lock_units: Option<f64>,
    pub press_mode: PressMode,
    pub press_trigger: u32,
    /// 0 = unlimited.
    pub press_depth: u32,
    /// Consecutive losses before the iron gate trips. 0 = disabled.
    pub iron_gate_limit: u32,
    /// Flat hands (counted in wins) after re-entering from the iron gate.
    pub reentry_flat_hands: u32,
    pub ratchet: RatchetMode,
    /// Early segments during which the ratchet and profit target are waived.
    pub ratchet_grind_segments: u32,
    pub target: TargetSelector,
    /// Second independent wager for dual-bet halting.
    pub secondary: Option<Wager>,
    pub shoes_per_session: u32,
    pub hands_per_shoe: u32,
    pub spins_per_session: u32,
    pub tie_bet: TieBet,
    pub spice: Option<SpiceSideBet>,
    pub recovery: RecoveryConfig,
    pub smart_exit: SmartExit,
}

impl Default for StrategyOverrides {
    fn default() -> Self {
        StrategyOverrides {
            name: "banker flat".to_string(),
            game: Game::Baccarat,
            stop_loss_units: None,
            profit_lock_units: None,
            press_mode: PressMode::Flat,
            press_trigger: 1,
            press_depth: 0,
            iron_gate_limit: 0,
            reentry_flat_hands: 0,
            ratchet: RatchetMode::Off,
            ratchet_grind_segments: 0,
            target: TargetSelector::default(),
            secondary: None,
            shoes_per_session: 1,
            hands_per_shoe: 72,
            spins_per_session: 60,
            tie_bet: TieBet::default(),
            spice: None,
            recovery: RecoveryConfig::default(),
            smart_exit: SmartExit::default(),
        }
    }
}

fn check_units(field: &'static str, value: f64) -> SimResult<()> {
    if value.is_nan() || value < 0.0 {
        return Err(SimError::NegativeUnits { field, value });
    }
    Ok(())
}

fn check_wager(game: Game, wager: Wager) -> SimResult<()> {
    if wager.game() != game || !wager.is_valid() {
        return Err(SimError::WagerMismatch {
            wager: wager.to_string(),
            game: game.to_string(),
        });
    }
    Ok(())
}

impl StrategyOverrides {
    pub fn validate(&self) -> SimResult<()> {
        if let Some(v) = self.stop_loss_units {
            check_units("stop_loss_units", v)?;
        }
        if let Some(v) = self.profit_lock_units {
            check_units("profit_lock_units", v)?;
        }
        check_units("tie_bet.units", self.tie_bet.units)?;
        check_units("recovery.target_units", self.recovery.target_units)?;
        check_units("recovery.stop_loss_units", self.recovery.stop_loss_units)?;
        check_units("smart_exit.activation_units", self.smart_exit.activation_units)?;
        check_units("smart_exit.trailing_units", self.smart_exit.trailing_units)?;

        match self.game {
            Game::Baccarat => {
                if self.shoes_per_session == 0 || self.hands_per_shoe == 0 {
                    return Err(SimError::InvalidConfig(
                        "baccarat sessions need at least one shoe of one hand".to_string(),
                    ));
                }
                if self.spice.is_some() {
                    return Err(SimError::InvalidConfig(
                        "spice bets are roulette only".to_string(),
                    ));
                }
            }
            Game::Roulette => {
                if self.spins_per_session == 0 {
                    return Err(SimError::InvalidConfig(
                        "roulette sessions need at least one spin".to_string(),
                    ));
                }
                if self.tie_bet.mode != TieBetMode::Off {
                    return Err(SimError::InvalidConfig(
                        "tie bets are baccarat only".to_string(),
                    ));
                }
            }
        }

        if let TargetSelector::Fixed(wager) = self.target {
            check_wager(self.game, wager)?;
            if wager == Wager::Tie {
                return Err(SimError::InvalidConfig(
                    "tie is a side bet, not a main target".to_string(),
                ));
            }
        }

        if let Some(secondary) = self.secondary {
            check_wager(self.game, secondary)?;
            if !self.press_mode.is_negative() {
                return Err(SimError::InvalidConfig(format!(
                    "dual-bet halting needs a negative progression, got {}",
                    self.press_mode
                )));
            }
            if self.target == TargetSelector::FollowWinner {
                return Err(SimError::InvalidConfig(
                    "dual-bet halting needs a fixed primary wager".to_string(),
                ));
            }
            if self.target == TargetSelector::Fixed(secondary) {
                return Err(SimError::InvalidConfig(
                    "secondary wager must differ from the primary".to_string(),
                ));
            }
        }

        if let Some(spice) = self.spice {
            check_units("spice.units", spice.units)?;
        }
        Ok(())
    }

    /// Hands (baccarat) or spins (roulette) in one full session.
    pub fn session_length(&self) -> u32 {
        match self.game {
            Game::Baccarat => self.shoes_per_session * self.hands_per_shoe,
            Game::Roulette => self.spins_per_session,
        }
    }

    /// Hands per segment; roulette sessions are a single segment.
    pub fn segment_length(&self) -> u32 {
        match self.game {
            Game::Baccarat => self.hands_per_shoe,
            Game::Roulette => self.spins_per_session,
        }
    }

    pub fn is_dual_bet(&self) -> bool {
        self.secondary.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wager::OutsideBet;

    #[test]
    fn default_is_valid() {
        StrategyOverrides::default().validate().unwrap();
    }

    #[test]
    fn negative_units_rejected() {
        let o = StrategyOverrides {
            stop_loss_units: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(o.validate(), Err(SimError::NegativeUnits { .. })));
    }

    #[test]
    fn dual_bet_needs_negative_family() {
        let o = StrategyOverrides {
            game: Game::Roulette,
            target: TargetSelector::Fixed(Wager::Outside(OutsideBet::Red)),
            secondary: Some(Wager::Outside(OutsideBet::Odd)),
            press_mode: PressMode::Standard,
            ..Default::default()
        };
        assert!(o.validate().is_err());
        let o = StrategyOverrides {
            press_mode: PressMode::SnapBack,
            ..o
        };
        o.validate().unwrap();
    }

    #[test]
    fn roulette_wager_in_baccarat_rejected() {
        let o = StrategyOverrides {
            target: TargetSelector::Fixed(Wager::Outside(OutsideBet::Red)),
            ..Default::default()
        };
        assert!(matches!(o.validate(), Err(SimError::WagerMismatch { .. })));
    }

    #[test]
    fn ratchet_floor_ladder() {
        let r = RatchetMode::Standard;
        assert_eq!(r.floor_for_peak(70.0, 10.0), None);
        assert_eq!(r.floor_for_peak(80.0, 10.0), Some(30.0));
        assert_eq!(r.floor_for_peak(130.0, 10.0), Some(50.0));
        assert_eq!(r.floor_for_peak(190.0, 10.0), Some(70.0));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let o: StrategyOverrides =
            serde_json::from_str(r#"{"press_mode":"gentle_surgeon","iron_gate_limit":3}"#).unwrap();
        assert_eq!(o.press_mode, PressMode::GentleSurgeon);
        assert_eq!(o.iron_gate_limit, 3);
        assert_eq!(o.hands_per_shoe, 72);
    }
}
