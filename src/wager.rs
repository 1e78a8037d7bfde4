//! Wager catalogue for baccarat and single-zero roulette.
//!
//! Roulette combination bets and betting patterns are described as legs:
//! a set of covered numbers and a chip weight. A leg covering `k` numbers
//! pays `36 / k - 1` to one, which matches the standard single-zero table
//! for straights, splits, trios, corners, six-lines, dozens and columns.

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub const ROULETTE_POCKETS: u8 = 37;

const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

pub fn is_red(n: u8) -> bool {
    RED_NUMBERS.contains(&n)
}

pub fn is_black(n: u8) -> bool {
    n != 0 && n < ROULETTE_POCKETS && !is_red(n)
}

// ---------------------------------------------------------------------------
// Game / side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Game {
    #[default]
    Baccarat,
    Roulette,
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Game::Baccarat => write!(f, "baccarat"),
            Game::Roulette => write!(f, "roulette"),
        }
    }
}

/// The "winning side" of a resolved hand, used by follow-the-winner
/// targeting. Ties and zero have no side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Banker,
    Player,
    Red,
    Black,
}

impl Side {
    pub fn wager(self) -> Wager {
        match self {
            Side::Banker => Wager::Banker,
            Side::Player => Wager::Player,
            Side::Red => Wager::Outside(OutsideBet::Red),
            Side::Black => Wager::Outside(OutsideBet::Black),
        }
    }
}

// ---------------------------------------------------------------------------
// Roulette building blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub numbers: Vec<u8>,
    pub chips: f64,
}

impl Leg {
    fn new(numbers: impl IntoIterator<Item = u8>, chips: f64) -> Self {
        Leg {
            numbers: numbers.into_iter().collect(),
            chips,
        }
    }

    /// Payout to one for a winning chip on this leg.
    pub fn odds(&self) -> f64 {
        36.0 / self.numbers.len() as f64 - 1.0
    }

    pub fn covers(&self, n: u8) -> bool {
        self.numbers.contains(&n)
    }
}

/// Total chips across a set of legs.
pub fn total_chips(legs: &[Leg]) -> f64 {
    legs.iter().map(|l| l.chips).sum()
}

/// Net result per chip for a leg set when `n` is drawn.
pub fn legs_net_per_chip(legs: &[Leg], n: u8) -> f64 {
    let cost = total_chips(legs);
    let returned: f64 = legs
        .iter()
        .filter(|l| l.covers(n))
        .map(|l| l.chips * (l.odds() + 1.0))
        .sum();
    returned - cost
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutsideBet {
    Red,
    Black,
    Even,
    Odd,
    Low,
    High,
    Dozen(u8),
    Column(u8),
}

impl OutsideBet {
    pub fn covers(self, n: u8) -> bool {
        if n == 0 || n >= ROULETTE_POCKETS {
            return false;
        }
        match self {
            OutsideBet::Red => is_red(n),
            OutsideBet::Black => is_black(n),
            OutsideBet::Even => n % 2 == 0,
            OutsideBet::Odd => n % 2 == 1,
            OutsideBet::Low => n <= 18,
            OutsideBet::High => n >= 19,
            OutsideBet::Dozen(d) => (n - 1) / 12 + 1 == d,
            OutsideBet::Column(c) => (n - 1) % 3 + 1 == c,
        }
    }

    /// Even-money bets lose only half the stake when zero hits.
    pub fn is_even_money(self) -> bool {
        !matches!(self, OutsideBet::Dozen(_) | OutsideBet::Column(_))
    }

    pub fn odds(self) -> f64 {
        if self.is_even_money() {
            1.0
        } else {
            2.0
        }
    }

    pub fn is_valid(self) -> bool {
        match self {
            OutsideBet::Dozen(d) | OutsideBet::Column(d) => (1..=3).contains(&d),
            _ => true,
        }
    }
}

impl fmt::Display for OutsideBet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutsideBet::Red => write!(f, "red"),
            OutsideBet::Black => write!(f, "black"),
            OutsideBet::Even => write!(f, "even"),
            OutsideBet::Odd => write!(f, "odd"),
            OutsideBet::Low => write!(f, "1-18"),
            OutsideBet::High => write!(f, "19-36"),
            OutsideBet::Dozen(d) => write!(f, "dozen {}", d),
            OutsideBet::Column(c) => write!(f, "column {}", c),
        }
    }
}

/// French call bets ("spice"): fixed clusters of splits, corners and
/// straights on the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpiceBet {
    JeuZero,
    Voisins,
    Tiers,
    Orphelins,
}

static JEU_ZERO: Lazy<Vec<Leg>> = Lazy::new(|| {
    vec![
        Leg::new([0, 3], 1.0),
        Leg::new([12, 15], 1.0),
        Leg::new([26], 1.0),
        Leg::new([32, 35], 1.0),
    ]
});

static VOISINS: Lazy<Vec<Leg>> = Lazy::new(|| {
    vec![
        Leg::new([0, 2, 3], 2.0),
        Leg::new([4, 7], 1.0),
        Leg::new([12, 15], 1.0),
        Leg::new([18, 21], 1.0),
        Leg::new([19, 22], 1.0),
        Leg::new([32, 35], 1.0),
        Leg::new([25, 26, 28, 29], 2.0),
    ]
});

static TIERS: Lazy<Vec<Leg>> = Lazy::new(|| {
    vec![
        Leg::new([5, 8], 1.0),
        Leg::new([10, 11], 1.0),
        Leg::new([13, 16], 1.0),
        Leg::new([23, 24], 1.0),
        Leg::new([27, 30], 1.0),
        Leg::new([33, 36], 1.0),
    ]
});

static ORPHELINS: Lazy<Vec<Leg>> = Lazy::new(|| {
    vec![
        Leg::new([1], 1.0),
        Leg::new([6, 9], 1.0),
        Leg::new([14, 17], 1.0),
        Leg::new([17, 20], 1.0),
        Leg::new([31, 34], 1.0),
    ]
});

impl SpiceBet {
    pub fn legs(self) -> &'static [Leg] {
        match self {
            SpiceBet::JeuZero => &JEU_ZERO,
            SpiceBet::Voisins => &VOISINS,
            SpiceBet::Tiers => &TIERS,
            SpiceBet::Orphelins => &ORPHELINS,
        }
    }

    /// Chips needed for one placement of the bet.
    pub fn chips(self) -> f64 {
        total_chips(self.legs())
    }
}

impl fmt::Display for SpiceBet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpiceBet::JeuZero => write!(f, "jeu zero"),
            SpiceBet::Voisins => write!(f, "voisins du zero"),
            SpiceBet::Tiers => write!(f, "tiers du cylindre"),
            SpiceBet::Orphelins => write!(f, "orphelins"),
        }
    }
}

/// Multi-leg main bets spread over the layout at fixed ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetPattern {
    JamesBond,
    TwoDozens,
    RedAndColumn,
}

static JAMES_BOND: Lazy<Vec<Leg>> = Lazy::new(|| {
    vec![
        Leg::new(19..=36, 14.0),
        Leg::new(13..=18, 5.0),
        Leg::new([0], 1.0),
    ]
});

static TWO_DOZENS: Lazy<Vec<Leg>> =
    Lazy::new(|| vec![Leg::new(1..=12, 1.0), Leg::new(13..=24, 1.0)]);

static RED_AND_COLUMN: Lazy<Vec<Leg>> = Lazy::new(|| {
    vec![
        Leg::new(RED_NUMBERS, 2.0),
        Leg::new((1..=36).filter(|n| n % 3 == 2), 1.0),
    ]
});

impl BetPattern {
    pub fn legs(self) -> &'static [Leg] {
        match self {
            BetPattern::JamesBond => &JAMES_BOND,
            BetPattern::TwoDozens => &TWO_DOZENS,
            BetPattern::RedAndColumn => &RED_AND_COLUMN,
        }
    }
}

impl fmt::Display for BetPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetPattern::JamesBond => write!(f, "james bond"),
            BetPattern::TwoDozens => write!(f, "two dozens"),
            BetPattern::RedAndColumn => write!(f, "red + column 2"),
        }
    }
}

// ---------------------------------------------------------------------------
// Wager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wager {
    Banker,
    Player,
    Tie,
    Outside(OutsideBet),
    Spice(SpiceBet),
    Pattern(BetPattern),
}

impl Wager {
    pub fn game(&self) -> Game {
        match self {
            Wager::Banker | Wager::Player | Wager::Tie => Game::Baccarat,
            Wager::Outside(_) | Wager::Spice(_) | Wager::Pattern(_) => Game::Roulette,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Wager::Outside(bet) => bet.is_valid(),
            _ => true,
        }
    }
}

impl fmt::Display for Wager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wager::Banker => write!(f, "banker"),
            Wager::Player => write!(f, "player"),
            Wager::Tie => write!(f, "tie"),
            Wager::Outside(bet) => write!(f, "{}", bet),
            Wager::Spice(bet) => write!(f, "{}", bet),
            Wager::Pattern(p) => write!(f, "{}", p),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
