//! Bankroll tiers: a monotonic step function from bankroll to bet unit,
//! press unit, stop loss, profit lock and table cap.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    pub level: u32,
    pub min_bankroll: f64,
    pub max_bankroll: f64,
    pub base_unit: f64,
    pub press_unit: f64,
    pub stop_loss: f64,
    pub profit_lock: f64,
    /// Per-hand table maximum for the total main stake. 0 = no cap.
    pub catastrophic_cap: f64,
}

impl TierConfig {
    pub fn contains(&self, bankroll: f64) -> bool {
        bankroll >= self.min_bankroll && bankroll < self.max_bankroll
    }
}

impl fmt::Display for TierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tier {} [{:.0}, {:.0}) unit {:.0}",
            self.level, self.min_bankroll, self.max_bankroll, self.base_unit
        )
    }
}

/// Parameters for generating a tier table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierParams {
    pub levels: u32,
    pub base_unit_start: f64,
    /// Bankroll needed per base unit to enter a tier.
    pub bankroll_units: f64,
    pub press_ratio: f64,
    pub stop_loss_units: f64,
    pub profit_lock_units: f64,
    pub cap_units: f64,
}

impl Default for TierParams {
    fn default() -> Self {
        TierParams {
            levels: 10,
            base_unit_start: 10.0,
            bankroll_units: 100.0,
            press_ratio: 1.0,
            stop_loss_units: 10.0,
            profit_lock_units: 10.0,
            cap_units: 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierMode {
    /// Tier follows the bankroll exactly.
    #[default]
    Reactive,
    /// Tier only drops after the bankroll falls a full stop loss below
    /// the current tier.
    Sticky,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    tiers: Vec<TierConfig>,
}

impl TierTable {
    pub fn new(tiers: Vec<TierConfig>) -> SimResult<Self> {
        let first = tiers
            .first()
            .ok_or_else(|| SimError::InvalidTierTable("no tiers".to_string()))?;
        if first.min_bankroll != 0.0 {
            return Err(SimError::InvalidTierTable(format!(
                "first tier starts at {}, expected 0",
                first.min_bankroll
            )));
        }
        for t in &tiers {
            if t.max_bankroll <= t.min_bankroll {
                return Err(SimError::InvalidTierTable(format!(
                    "tier {} has empty range",
                    t.level
                )));
            }
            if t.base_unit <= 0.0 {
                return Err(SimError::InvalidTierTable(format!(
                    "tier {} base unit must be positive",
                    t.level
                )));
            }
        }
        for (a, b) in tiers.iter().tuple_windows() {
            if a.max_bankroll != b.min_bankroll {
                return Err(SimError::InvalidTierTable(format!(
                    "gap or overlap between tier {} and {}",
                    a.level, b.level
                )));
            }
            if b.base_unit < a.base_unit {
                return Err(SimError::InvalidTierTable(format!(
                    "base unit decreases from tier {} to {}",
                    a.level, b.level
                )));
            }
            if b.level <= a.level {
                return Err(SimError::InvalidTierTable(format!(
                    "levels out of order at tier {}",
                    b.level
                )));
            }
        }
        Ok(TierTable { tiers })
    }

    pub fn generate(params: &TierParams) -> SimResult<Self> {
        if params.levels == 0 || params.base_unit_start <= 0.0 || params.bankroll_units <= 0.0 {
            return Err(SimError::InvalidValue(
                "tier params need levels > 0 and positive units".to_string(),
            ));
        }
        let unit = |i: u32| params.base_unit_start * (i + 1) as f64;
        let tiers = (0..params.levels)
            .map(|i| {
                let base = unit(i);
                let min_bankroll = if i == 0 {
                    0.0
                } else {
                    params.bankroll_units * base
                };
                let max_bankroll = if i + 1 == params.levels {
                    f64::MAX
                } else {
                    params.bankroll_units * unit(i + 1)
                };
                TierConfig {
                    level: i + 1,
                    min_bankroll,
                    max_bankroll,
                    base_unit: base,
                    press_unit: base * params.press_ratio,
                    stop_loss: base * params.stop_loss_units,
                    profit_lock: base * params.profit_lock_units,
                    catastrophic_cap: base * params.cap_units,
                }
            })
            .collect();
        TierTable::new(tiers)
    }

    pub fn tiers(&self) -> &[TierConfig] {
        &self.tiers
    }

    pub fn by_level(&self, level: u32) -> Option<&TierConfig> {
        self.tiers.iter().find(|t| t.level == level)
    }

    fn reactive(&self, bankroll: f64) -> &TierConfig {
        self.tiers
            .iter()
            .find(|t| t.contains(bankroll))
            .unwrap_or_else(|| {
                if bankroll < self.tiers[0].min_bankroll {
                    &self.tiers[0]
                } else {
                    &self.tiers[self.tiers.len() - 1]
                }
            })
    }
}

/// Pick the tier to play at.
///
/// In sticky mode the previous session's level is kept until the bankroll
/// either climbs into a higher tier or falls below
/// `min_bankroll - stop_loss` of the sticky tier.
pub fn tier_for_bankroll<'a>(
    bankroll: f64,
    table: &'a TierTable,
    sticky_level: Option<u32>,
    mode: TierMode,
) -> SimResult<&'a TierConfig> {
    if !bankroll.is_finite() {
        return Err(SimError::InvalidValue(format!("bankroll {}", bankroll)));
    }
    let reactive = table.reactive(bankroll);
    let sticky = match (mode, sticky_level) {
        (TierMode::Sticky, Some(level)) => table.by_level(level),
        _ => None,
    };
    let Some(current) = sticky else {
        return Ok(reactive);
    };
    if reactive.level >= current.level {
        return Ok(reactive);
    }
    if bankroll < current.min_bankroll - current.stop_loss {
        Ok(reactive)
    } else {
        Ok(current)
    }
}
