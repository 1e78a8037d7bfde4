pub mod career;
pub mod cli;
pub mod decision;
pub mod display;
pub mod ensemble;
pub mod error;
pub mod outcome;
pub mod profile;
pub mod progression;
pub mod rng;
pub mod session;
pub mod state;
pub mod strategy;
pub mod tiers;
pub mod wager;
