//! Career driver: months of sessions with compounding bankroll, tax,
//! contributions, insolvency and promotion between strategy legs.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{SimError, SimResult};
use crate::rng::DrawSource;
use crate::session::run_session;
use crate::state::SessionPlan;
use crate::strategy::StrategyOverrides;
use crate::tiers::{tier_for_bankroll, TierMode, TierParams, TierTable};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxRule {
    /// Monthly winnings exempt from tax.
    pub threshold: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionRule {
    pub after_win: f64,
    pub after_loss: f64,
    /// No contributions once the bankroll reaches this.
    pub holiday_ceiling: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerLeg {
    pub name: String,
    pub overrides: StrategyOverrides,
    /// Bankroll that promotes to the next leg.
    pub target_bankroll: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub bankroll: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareerConfig {
    pub start_bankroll: f64,
    pub years: u32,
    pub sessions_per_year: u32,
    pub tier_mode: TierMode,
    pub tier_params: TierParams,
    pub insolvency_floor: f64,
    pub tax: Option<TaxRule>,
    pub contribution: Option<ContributionRule>,
    pub legs: Vec<CareerLeg>,
    pub milestone: Option<Milestone>,
}

impl Default for CareerConfig {
    fn default() -> Self {
        CareerConfig {
            start_bankroll: 2000.0,
            years: 5,
            sessions_per_year: 50,
            tier_mode: TierMode::Reactive,
            tier_params: TierParams::default(),
            insolvency_floor: 200.0,
            tax: None,
            contribution: None,
            legs: vec![CareerLeg {
                name: "default".to_string(),
                overrides: StrategyOverrides::default(),
                target_bankroll: None,
            }],
            milestone: None,
        }
    }
}

impl CareerConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.legs.is_empty() {
            return Err(SimError::InvalidConfig("career needs at least one leg".to_string()));
        }
        if !self.start_bankroll.is_finite() || self.start_bankroll < 0.0 {
            return Err(SimError::InvalidValue(format!(
                "start bankroll {}",
                self.start_bankroll
            )));
        }
        if let Some(tax) = &self.tax {
            if !(0.0..=1.0).contains(&tax.rate) || tax.threshold < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "tax rate {} / threshold {}",
                    tax.rate, tax.threshold
                )));
            }
        }
        if let Some(c) = &self.contribution {
            if c.after_win < 0.0 || c.after_loss < 0.0 {
                return Err(SimError::InvalidConfig("contributions must be >= 0".to_string()));
            }
        }
        for leg in &self.legs {
            leg.overrides.validate()?;
        }
        Ok(())
    }

    pub fn months(&self) -> u32 {
        self.years * 12
    }

    /// Sessions in calendar month `m` (0-based): the yearly count spread
    /// evenly, remainder going to the first months of each year.
    pub fn sessions_in_month(&self, m: u32) -> u32 {
        let per = self.sessions_per_year / 12;
        let rem = self.sessions_per_year % 12;
        per + u32::from(m % 12 < rem)
    }
}

// ---------------------------------------------------------------------------
// Trajectory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TargetReached,
    Promotion,
    Insolvent,
    Tax,
    Contribution,
    Holiday,
    Milestone,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::TargetReached => "target reached",
            EventKind::Promotion => "promotion",
            EventKind::Insolvent => "insolvent",
            EventKind::Tax => "tax",
            EventKind::Contribution => "contribution",
            EventKind::Holiday => "holiday",
            EventKind::Milestone => "milestone",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerEvent {
    pub month: u32,
    pub kind: EventKind,
    pub amount: f64,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerTrajectory {
    /// Month-end bankroll, one entry per simulated month.
    pub bankroll: Vec<f64>,
    /// Leg index in force during each month.
    pub leg_by_month: Vec<usize>,
    pub events: Vec<CareerEvent>,
    pub tax_paid: f64,
    pub contributed: f64,
    pub insolvent_months: u32,
    pub sessions_played: u32,
    pub milestone_month: Option<u32>,
}

impl CareerTrajectory {
    pub fn final_bankroll(&self) -> f64 {
        self.bankroll.last().copied().unwrap_or(0.0)
    }

    pub fn events_of(&self, kind: EventKind) -> impl Iterator<Item = &CareerEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

struct Career<'a> {
    config: &'a CareerConfig,
    table: &'a TierTable,
    bankroll: f64,
    leg: usize,
    pending_promotion: bool,
    sticky_level: Option<u32>,
    last_session_pnl: Option<f64>,
    recovery_chain: u32,
    month_winnings: f64,
    out: CareerTrajectory,
}

impl<'a> Career<'a> {
    fn event(&mut self, month: u32, kind: EventKind, amount: f64, detail: String) {
        self.out.events.push(CareerEvent {
            month,
            kind,
            amount,
            detail,
        });
    }

    fn start_of_month(&mut self, month: u32) {
        let config = self.config;
        if self.pending_promotion {
            let from = config.legs[self.leg].name.clone();
            self.leg += 1;
            self.pending_promotion = false;
            self.sticky_level = None;
            self.recovery_chain = 0;
            let to = config.legs[self.leg].name.clone();
            info!(month, from = %from, to = %to, "career promotion");
            self.event(month, EventKind::Promotion, self.bankroll, format!("{} -> {}", from, to));
        }

        if let Some(tax) = config.tax {
            if self.month_winnings > tax.threshold {
                let due = (self.month_winnings - tax.threshold) * tax.rate;
                if due > 0.0 {
                    self.bankroll -= due;
                    self.out.tax_paid += due;
                    self.event(month, EventKind::Tax, due, format!("on {:.2}", self.month_winnings));
                }
            }
        }
        self.month_winnings = 0.0;

        if let Some(c) = config.contribution {
            let amount = match self.last_session_pnl {
                Some(p) if p > 0.0 => c.after_win,
                _ => c.after_loss,
            };
            if amount > 0.0 {
                if self.bankroll >= c.holiday_ceiling {
                    self.event(month, EventKind::Holiday, amount, "contribution skipped".to_string());
                } else {
                    self.bankroll += amount;
                    self.out.contributed += amount;
                    self.event(month, EventKind::Contribution, amount, String::new());
                }
            }
        }
    }

    fn play_month(&mut self, month: u32, source: &mut dyn DrawSource) -> SimResult<()> {
        let config = self.config;
        let leg = &config.legs[self.leg];
        for _ in 0..config.sessions_in_month(month) {
            if self.bankroll < config.insolvency_floor {
                break;
            }
            let tier = tier_for_bankroll(
                self.bankroll,
                self.table,
                self.sticky_level,
                config.tier_mode,
            )?;
            let plan = match self.last_session_pnl {
                Some(p)
                    if p < 0.0
                        && leg.overrides.recovery.enabled
                        && self.recovery_chain < leg.overrides.recovery.max_chain =>
                {
                    SessionPlan::Recovery { last_loss: -p }
                }
                _ => SessionPlan::Standard,
            };
            self.recovery_chain = match plan {
                SessionPlan::Recovery { .. } => self.recovery_chain + 1,
                SessionPlan::Standard => 0,
            };

            let summary = run_session(&leg.overrides, tier, self.bankroll, plan, source)?;
            self.bankroll += summary.pnl;
            self.month_winnings += summary.pnl;
            self.sticky_level = Some(summary.tier_level);
            self.last_session_pnl = Some(summary.pnl);
            self.out.sessions_played += 1;
        }
        Ok(())
    }

    fn end_of_month(&mut self, month: u32) {
        let config = self.config;
        let leg = &config.legs[self.leg];
        if let Some(target) = leg.target_bankroll {
            if self.bankroll >= target && self.leg + 1 < config.legs.len() && !self.pending_promotion {
                self.pending_promotion = true;
                let detail = format!("{} reached {:.0}", leg.name, target);
                self.event(month, EventKind::TargetReached, self.bankroll, detail);
            }
        }
        if let Some(m) = &config.milestone {
            if self.out.milestone_month.is_none() && self.bankroll >= m.bankroll {
                self.out.milestone_month = Some(month);
                let detail = m.name.clone();
                self.event(month, EventKind::Milestone, self.bankroll, detail);
            }
        }
        self.out.bankroll.push(self.bankroll);
        self.out.leg_by_month.push(self.leg);
    }
}

/// Run one career trajectory.
pub fn run_career(
    config: &CareerConfig,
    table: &TierTable,
    source: &mut dyn DrawSource,
) -> SimResult<CareerTrajectory> {
    config.validate()?;
    let months = config.months() as usize;
    let mut career = Career {
        config,
        table,
        bankroll: config.start_bankroll,
        leg: 0,
        pending_promotion: false,
        sticky_level: None,
        last_session_pnl: None,
        recovery_chain: 0,
        month_winnings: 0.0,
        out: CareerTrajectory {
            bankroll: Vec::with_capacity(months),
            leg_by_month: Vec::with_capacity(months),
            events: Vec::new(),
            tax_paid: 0.0,
            contributed: 0.0,
            insolvent_months: 0,
            sessions_played: 0,
            milestone_month: None,
        },
    };

    for month in 0..config.months() {
        career.start_of_month(month);
        if career.bankroll < config.insolvency_floor {
            career.out.insolvent_months += 1;
            let bankroll = career.bankroll;
            info!(month, bankroll, "insolvent, month skipped");
            career.event(month, EventKind::Insolvent, bankroll, "below floor".to_string());
        } else {
            career.play_month(month, source)?;
        }
        career.end_of_month(month);
    }

    debug!(
        final_bankroll = career.bankroll,
        sessions = career.out.sessions_played,
        insolvent = career.out.insolvent_months,
        "career finished"
    );
    Ok(career.out)
}

/// Build the tier table for a career from its parameters.
pub fn career_table(config: &CareerConfig) -> SimResult<TierTable> {
    TierTable::generate(&config.tier_params)
}
