//! Outcome drawing and bet resolution.
//!
//! One draw per hand/spin. Every active stake is resolved against that same
//! draw; the net sum feeds streak bookkeeping and the per-bet breakdown
//! feeds dual-bet progressions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::rng::DrawSource;
use crate::wager::{is_black, is_red, legs_net_per_chip, total_chips, Game, Side, Wager, ROULETTE_POCKETS};

pub const BANKER_PROB: f64 = 0.458_597;
pub const PLAYER_PROB: f64 = 0.446_247;
pub const TIE_PROB: f64 = 1.0 - BANKER_PROB - PLAYER_PROB;

/// Banker wins pay 0.95 to one after commission.
pub const BANKER_PAYOUT: f64 = 0.95;
pub const TIE_PAYOUT: f64 = 8.0;

// ---------------------------------------------------------------------------
// Draws
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaccaratOutcome {
    Banker,
    Player,
    Tie,
}

impl BaccaratOutcome {
    pub fn from_unit(u: f64) -> Self {
        if u < BANKER_PROB {
            BaccaratOutcome::Banker
        } else if u < BANKER_PROB + PLAYER_PROB {
            BaccaratOutcome::Player
        } else {
            BaccaratOutcome::Tie
        }
    }

    /// A draw value that maps back to this outcome (band midpoint).
    pub fn representative_draw(self) -> f64 {
        match self {
            BaccaratOutcome::Banker => BANKER_PROB / 2.0,
            BaccaratOutcome::Player => BANKER_PROB + PLAYER_PROB / 2.0,
            BaccaratOutcome::Tie => BANKER_PROB + PLAYER_PROB + TIE_PROB / 2.0,
        }
    }
}

impl fmt::Display for BaccaratOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaccaratOutcome::Banker => write!(f, "B"),
            BaccaratOutcome::Player => write!(f, "P"),
            BaccaratOutcome::Tie => write!(f, "T"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draw {
    Baccarat(BaccaratOutcome),
    Roulette(u8),
}

impl Draw {
    pub fn from_unit(game: Game, u: f64) -> Self {
        match game {
            Game::Baccarat => Draw::Baccarat(BaccaratOutcome::from_unit(u)),
            Game::Roulette => {
                let n = (u * ROULETTE_POCKETS as f64).floor() as u8;
                Draw::Roulette(n.min(ROULETTE_POCKETS - 1))
            }
        }
    }

    pub fn sample(game: Game, source: &mut dyn DrawSource) -> Self {
        Draw::from_unit(game, source.next_unit())
    }

    pub fn game(&self) -> Game {
        match self {
            Draw::Baccarat(_) => Game::Baccarat,
            Draw::Roulette(_) => Game::Roulette,
        }
    }

    /// Side that won, ignoring ties and zero.
    pub fn winning_side(&self) -> Option<Side> {
        match *self {
            Draw::Baccarat(BaccaratOutcome::Banker) => Some(Side::Banker),
            Draw::Baccarat(BaccaratOutcome::Player) => Some(Side::Player),
            Draw::Baccarat(BaccaratOutcome::Tie) => None,
            Draw::Roulette(n) if is_red(n) => Some(Side::Red),
            Draw::Roulette(n) if is_black(n) => Some(Side::Black),
            Draw::Roulette(_) => None,
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, Draw::Baccarat(BaccaratOutcome::Tie))
    }
}

impl fmt::Display for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Draw::Baccarat(o) => write!(f, "{}", o),
            Draw::Roulette(n) => write!(f, "{}", n),
        }
    }
}

// ---------------------------------------------------------------------------
// Stakes and resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetRole {
    Main,
    Secondary,
    Side,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stake {
    pub wager: Wager,
    pub amount: f64,
    pub role: BetRole,
}

impl Stake {
    pub fn new(wager: Wager, amount: f64, role: BetRole) -> Self {
        Stake { wager, amount, role }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetResult {
    pub wager: Wager,
    pub role: BetRole,
    pub stake: f64,
    pub pnl: f64,
}

impl BetResult {
    pub fn won(&self) -> bool {
        self.pnl > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandResult {
    Win,
    Loss,
    Push,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub pnl: f64,
    pub result: HandResult,
    pub was_tie: bool,
    pub side: Option<Side>,
    pub bets: Vec<BetResult>,
}

impl Resolution {
    pub fn won(&self) -> bool {
        self.result == HandResult::Win
    }

    pub fn bet(&self, role: BetRole) -> Option<&BetResult> {
        self.bets.iter().find(|b| b.role == role)
    }

    pub fn volume(&self) -> f64 {
        self.bets.iter().map(|b| b.stake.abs()).sum()
    }
}

/// P&L of a single wager of `stake` against `draw`.
pub fn wager_pnl(wager: Wager, stake: f64, draw: Draw) -> SimResult<f64> {
    if wager.game() != draw.game() {
        return Err(SimError::WagerMismatch {
            wager: wager.to_string(),
            game: draw.game().to_string(),
        });
    }
    if stake == 0.0 {
        return Ok(0.0);
    }
    let pnl = match (wager, draw) {
        (Wager::Banker, Draw::Baccarat(o)) => match o {
            BaccaratOutcome::Banker => stake * BANKER_PAYOUT,
            BaccaratOutcome::Player => -stake,
            BaccaratOutcome::Tie => 0.0,
        },
        (Wager::Player, Draw::Baccarat(o)) => match o {
            BaccaratOutcome::Player => stake,
            BaccaratOutcome::Banker => -stake,
            BaccaratOutcome::Tie => 0.0,
        },
        (Wager::Tie, Draw::Baccarat(o)) => match o {
            BaccaratOutcome::Tie => stake * TIE_PAYOUT,
            _ => -stake,
        },
        (Wager::Outside(bet), Draw::Roulette(n)) => {
            if n == 0 && bet.is_even_money() {
                -stake / 2.0
            } else if bet.covers(n) {
                stake * bet.odds()
            } else {
                -stake
            }
        }
        (Wager::Spice(bet), Draw::Roulette(n)) => {
            let chip = stake / bet.chips();
            chip * legs_net_per_chip(bet.legs(), n)
        }
        (Wager::Pattern(p), Draw::Roulette(n)) => {
            let chip = stake / total_chips(p.legs());
            chip * legs_net_per_chip(p.legs(), n)
        }
        _ => unreachable!("game checked above"),
    };
    Ok(pnl)
}

/// Resolve every stake against one draw.
pub fn resolve(stakes: &[Stake], draw: Draw) -> SimResult<Resolution> {
    let mut bets = Vec::with_capacity(stakes.len());
    for s in stakes {
        if s.amount < 0.0 {
            return Err(SimError::InvariantViolation(format!(
                "negative stake {} on {}",
                s.amount, s.wager
            )));
        }
        bets.push(BetResult {
            wager: s.wager,
            role: s.role,
            stake: s.amount,
            pnl: wager_pnl(s.wager, s.amount, draw)?,
        });
    }

    let pnl: f64 = bets.iter().map(|b| b.pnl).sum();
    let was_tie = draw.is_tie();
    let result = if was_tie || pnl == 0.0 {
        HandResult::Push
    } else if pnl > 0.0 {
        HandResult::Win
    } else {
        HandResult::Loss
    };

    Ok(Resolution {
        pnl,
        result,
        was_tie,
        side: draw.winning_side(),
        bets,
    })
}
