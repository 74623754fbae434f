pub mod api;
pub mod game;
pub mod sim;
pub mod write;

use blackjack_lib::BlackjackGameError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod prelude {
    pub use super::{
        game::{parse_bet, GameSession, RoundOutcome, RoundPhase},
        game::snapshot::{CardView, TableSnapshot},
        sim::{OutcomeSimulator, WinRates},
        EstimateMode, SimulationError, TrainerConfig, TrainerConfigBuilder,
    };
    pub use blackjack_lib::prelude::*;
}

/// Errors raised outside of the game rules themselves, i.e. while handing work to the estimate worker.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    GameError(#[from] BlackjackGameError),
    #[error("{0}")]
    SendingError(String),
}

/// Where win/push estimates are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimateMode {
    /// Computed before the command returns.
    Inline,
    /// Computed on a worker thread and picked up with `GameSession::refresh_rates`.
    Background,
}

/// Struct for configuring a `GameSession`. Everything here is fixed once the session is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainerConfig {
    pub num_decks: usize,
    pub starting_chips: u32,
    pub num_trials: u32,
    pub seed: Option<u64>,
    pub estimate_mode: EstimateMode,
}

impl TrainerConfig {
    /// Associated method for returning a new `TrainerConfigBuilder` object, any option that is not
    /// set falls back to the standard trainer table: five decks, 1000 chips and 10,000 trials per estimate.
    pub fn new() -> TrainerConfigBuilder {
        TrainerConfigBuilder {
            num_decks: None,
            starting_chips: None,
            num_trials: None,
            seed: None,
            estimate_mode: None,
        }
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig::new().build()
    }
}

/// Struct to implement builder pattern for `TrainerConfig`
#[derive(Debug, Clone, Copy)]
pub struct TrainerConfigBuilder {
    num_decks: Option<usize>,
    starting_chips: Option<u32>,
    num_trials: Option<u32>,
    seed: Option<u64>,
    estimate_mode: Option<EstimateMode>,
}

impl TrainerConfigBuilder {
    /// Method for choosing the number of decks in the shoe
    pub fn num_decks(&mut self, decks: usize) -> &mut Self {
        self.num_decks = Some(decks);
        self
    }

    /// Method for setting the chips the player starts with, and is given back on a new game
    pub fn starting_chips(&mut self, chips: u32) -> &mut Self {
        self.starting_chips = Some(chips);
        self
    }

    /// Method for setting the number of Monte-Carlo trials per estimate
    pub fn num_trials(&mut self, trials: u32) -> &mut Self {
        self.num_trials = Some(trials);
        self
    }

    /// Method for fixing the random seed, every shuffle and estimate is reproducible with a fixed seed
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    pub fn estimate_mode(&mut self, mode: EstimateMode) -> &mut Self {
        self.estimate_mode = Some(mode);
        self
    }

    /// Method for building a `TrainerConfig` object from the given `TrainerConfigBuilder` object.
    pub fn build(&mut self) -> TrainerConfig {
        TrainerConfig {
            num_decks: self.num_decks.unwrap_or(5),
            starting_chips: self.starting_chips.unwrap_or(1000),
            num_trials: self.num_trials.unwrap_or(sim::DEFAULT_TRIALS),
            seed: self.seed,
            estimate_mode: self.estimate_mode.unwrap_or(EstimateMode::Inline),
        }
    }
}
