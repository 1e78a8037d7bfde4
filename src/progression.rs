//! Bet-size progressions.
//!
//! Every family reads a single `level` counter plus the press streak. The
//! session keeps exactly one level, so only the configured family can move.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

const CAROLINE: [f64; 5] = [1.0, 1.0, 2.0, 3.0, 4.0];
const GENTLE_SURGEON: [f64; 3] = [1.0, 2.0, 4.0];
const SNAP_BACK: [f64; 4] = [1.0, 2.0, 4.0, 7.0];
const WINNERS_GUARD: [f64; 4] = [1.0, 1.0, 2.0, 4.0];

/// Highest usable index for profit-guarded families while the session is up.
pub const PROFIT_GUARD_INDEX: usize = 2;

/// D'Alembert bets stay within [1, 5] units.
const DALEMBERT_MAX_LEVEL: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressMode {
    #[default]
    Flat,
    /// base + min(streak, depth) × press unit once the win streak reaches
    /// the trigger.
    Standard,
    /// 1.5× after one win, 2.5× after two or more.
    Titan,
    DAlembert,
    /// 1-1-2-3-4, advancing on wins.
    Caroline,
    /// 1-2-4, advancing on losses.
    GentleSurgeon,
    /// 1-2-4-7, advancing on losses.
    SnapBack,
    /// 1-1-2-4 with the profit guard.
    WinnersGuard,
    /// 1-2-4-7 with the profit guard.
    ProfitGuard,
}

impl PressMode {
    /// Legacy integer codes used by stored profiles.
    pub fn from_code(code: u8) -> SimResult<Self> {
        match code {
            0 => Ok(PressMode::Flat),
            1 => Ok(PressMode::Standard),
            2 => Ok(PressMode::Titan),
            3 => Ok(PressMode::DAlembert),
            4 => Ok(PressMode::Caroline),
            5 => Ok(PressMode::GentleSurgeon),
            6 => Ok(PressMode::SnapBack),
            7 => Ok(PressMode::WinnersGuard),
            8 => Ok(PressMode::ProfitGuard),
            _ => Err(SimError::UnknownPressMode(code)),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            PressMode::Flat => 0,
            PressMode::Standard => 1,
            PressMode::Titan => 2,
            PressMode::DAlembert => 3,
            PressMode::Caroline => 4,
            PressMode::GentleSurgeon => 5,
            PressMode::SnapBack => 6,
            PressMode::WinnersGuard => 7,
            PressMode::ProfitGuard => 8,
        }
    }

    /// Unit multipliers for sequence-based families.
    pub fn sequence(self) -> Option<&'static [f64]> {
        match self {
            PressMode::Caroline => Some(&CAROLINE),
            PressMode::GentleSurgeon => Some(&GENTLE_SURGEON),
            PressMode::SnapBack | PressMode::ProfitGuard => Some(&SNAP_BACK),
            PressMode::WinnersGuard => Some(&WINNERS_GUARD),
            PressMode::Flat | PressMode::Standard | PressMode::Titan | PressMode::DAlembert => None,
        }
    }

    /// Families whose level advances on a loss.
    pub fn is_negative(self) -> bool {
        matches!(
            self,
            PressMode::GentleSurgeon
                | PressMode::SnapBack
                | PressMode::WinnersGuard
                | PressMode::ProfitGuard
        )
    }

    pub fn is_profit_guarded(self) -> bool {
        matches!(self, PressMode::WinnersGuard | PressMode::ProfitGuard)
    }

    pub fn max_level(self) -> usize {
        match self {
            PressMode::Flat | PressMode::Standard | PressMode::Titan => 0,
            PressMode::DAlembert => DALEMBERT_MAX_LEVEL,
            _ => self.sequence().map(|s| s.len() - 1).unwrap_or(0),
        }
    }

    /// Level cap given the session's running P&L.
    pub fn level_cap(self, session_pnl: f64) -> usize {
        if self.is_profit_guarded() && session_pnl > 0.0 {
            self.max_level().min(PROFIT_GUARD_INDEX)
        } else {
            self.max_level()
        }
    }
}

impl fmt::Display for PressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PressMode::Flat => "flat",
            PressMode::Standard => "standard press",
            PressMode::Titan => "titan",
            PressMode::DAlembert => "capped d'alembert",
            PressMode::Caroline => "la caroline",
            PressMode::GentleSurgeon => "gentle surgeon",
            PressMode::SnapBack => "negatif snap-back",
            PressMode::WinnersGuard => "winner's guard",
            PressMode::ProfitGuard => "negatif profit guard",
        };
        write!(f, "{}", name)
    }
}

/// A configured progression: family plus press parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progression {
    pub mode: PressMode,
    pub base_unit: f64,
    pub press_unit: f64,
    pub press_trigger: u32,
    /// 0 = unlimited.
    pub press_depth: u32,
}

impl Progression {
    /// Stake for the next hand.
    pub fn stake(&self, level: usize, press_streak: u32, session_pnl: f64) -> f64 {
        let base = self.base_unit;
        match self.mode {
            PressMode::Flat => base,
            PressMode::Standard => {
                if press_streak >= self.press_trigger.max(1) {
                    let steps = if self.press_depth == 0 {
                        press_streak
                    } else {
                        press_streak.min(self.press_depth)
                    };
                    base + steps as f64 * self.press_unit
                } else {
                    base
                }
            }
            PressMode::Titan => match press_streak {
                0 => base,
                1 => base * 1.5,
                _ => base * 2.5,
            },
            PressMode::DAlembert => {
                (base + level as f64 * base).clamp(base, base * (DALEMBERT_MAX_LEVEL + 1) as f64)
            }
            PressMode::Caroline
            | PressMode::GentleSurgeon
            | PressMode::SnapBack
            | PressMode::WinnersGuard
            | PressMode::ProfitGuard => {
                let idx = level.min(self.mode.level_cap(session_pnl));
                base * self.sequence_at(idx)
            }
        }
    }

    /// Multiplier for a sequence family at `idx` (clamped to the sequence).
    pub fn sequence_at(&self, idx: usize) -> f64 {
        match self.mode.sequence() {
            Some(seq) => seq[idx.min(seq.len() - 1)],
            None => 1.0,
        }
    }

    /// Level after a winning hand.
    pub fn after_win(&self, level: usize) -> usize {
        match self.mode {
            PressMode::Flat | PressMode::Standard | PressMode::Titan => 0,
            PressMode::DAlembert => level.saturating_sub(1),
            PressMode::Caroline => (level + 1).min(self.mode.max_level()),
            PressMode::GentleSurgeon
            | PressMode::SnapBack
            | PressMode::WinnersGuard
            | PressMode::ProfitGuard => 0,
        }
    }

    /// Level after a losing hand, given the P&L after that hand.
    pub fn after_loss(&self, level: usize, session_pnl: f64) -> usize {
        match self.mode {
            PressMode::Flat | PressMode::Standard | PressMode::Titan => 0,
            PressMode::DAlembert => (level + 1).min(DALEMBERT_MAX_LEVEL),
            PressMode::Caroline => 0,
            PressMode::GentleSurgeon
            | PressMode::SnapBack
            | PressMode::WinnersGuard
            | PressMode::ProfitGuard => (level + 1).min(self.mode.level_cap(session_pnl)),
        }
    }

    /// Whether a win or loss progression is currently running.
    pub fn is_active(&self, level: usize, press_streak: u32, consecutive_losses: u32) -> bool {
        match self.mode {
            PressMode::Flat => false,
            PressMode::Standard | PressMode::Titan => press_streak > 0 || consecutive_losses > 0,
            _ => level > 0 || press_streak > 0 || consecutive_losses > 0,
        }
    }
}
