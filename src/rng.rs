//! Uniform draw sources.
//!
//! Everything random in a simulation comes from a `DrawSource` handed in by
//! the caller, so a seeded source replays the same trajectory bit for bit.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::outcome::BaccaratOutcome;

/// A source of uniform draws in [0, 1).
pub trait DrawSource {
    fn next_unit(&mut self) -> f64;
}

/// `StdRng`-backed source.
pub struct SeededDraw {
    rng: StdRng,
}

impl SeededDraw {
    pub fn new(seed: u64) -> Self {
        SeededDraw {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        SeededDraw {
            rng: StdRng::from_entropy(),
        }
    }
}

impl DrawSource for SeededDraw {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted. An empty list
/// replays 0.0.
#[derive(Debug, Clone)]
pub struct ScriptedDraw {
    values: VecDeque<f64>,
}

impl ScriptedDraw {
    pub fn new(values: Vec<f64>) -> Self {
        let values = if values.is_empty() { vec![0.0] } else { values };
        ScriptedDraw {
            values: values.into(),
        }
    }

    /// Script a sequence of baccarat outcomes.
    pub fn baccarat(outcomes: &[BaccaratOutcome]) -> Self {
        Self::new(outcomes.iter().map(|o| o.representative_draw()).collect())
    }

    /// Script a sequence of roulette numbers.
    pub fn roulette(numbers: &[u8]) -> Self {
        Self::new(
            numbers
                .iter()
                .map(|&n| (n as f64 + 0.5) / crate::wager::ROULETTE_POCKETS as f64)
                .collect(),
        )
    }
}

impl DrawSource for ScriptedDraw {
    fn next_unit(&mut self) -> f64 {
        let v = self.values.pop_front().unwrap_or(0.0);
        self.values.push_back(v);
        v
    }
}
