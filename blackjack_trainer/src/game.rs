//! The trainer table: a single player against the dealer, with chip bookkeeping, running counts
//! and a fresh win/push estimate after every action that changes what the player can see.

pub mod snapshot;

use crate::sim::worker::{EstimateRequest, EstimateResult, EstimateWorker};
use crate::sim::{unseen_cards, OutcomeSimulator, WinRates};
use crate::{EstimateMode, TrainerConfig};
use blackjack_lib::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use snapshot::{CardView, TableSnapshot};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Where the current round stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// Waiting for a bet, no cards on the table yet.
    Betting,
    PlayerTurn,
    /// Set while `stand` plays the dealer out. `stand` settles the round before it returns, so
    /// callers only ever see this if they inspect the session mid-command.
    DealerTurn,
    /// The round is over and paid out, the hands stay on the table until the next bet.
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Win,
    Loss,
    Push,
}

enum Estimator {
    Inline,
    Background(EstimateWorker),
}

/// Parses a bet typed by the user, rejecting anything that is not a positive whole number.
pub fn parse_bet(input: &str) -> Result<u32, BlackjackGameError> {
    let trimmed = input.trim();
    let amount = trimmed
        .parse::<i64>()
        .map_err(|_| BlackjackGameError::InvalidBet(format!("'{}' is not a number", trimmed)))?;
    if amount <= 0 {
        return Err(BlackjackGameError::InvalidBet(
            "bet must be a positive amount".to_string(),
        ));
    }
    u32::try_from(amount)
        .map_err(|_| BlackjackGameError::InvalidBet(format!("{} is too large", amount)))
}

/// The whole state of one player's session at the table. Every command is a method taking
/// `&mut self`; a command that returns an error has not changed anything.
pub struct GameSession {
    config: TrainerConfig,
    rng: StdRng,
    shoe: Shoe,
    counter: CardCounter,
    player_hand: Hand,
    dealer_hand: Hand,
    dealer_visible: bool,
    chip_count: u64,
    current_bet: u32,
    pending_bet: Option<u32>,
    phase: RoundPhase,
    outcome: Option<RoundOutcome>,
    rates: WinRates,
    estimate_pending: bool,
    simulator: OutcomeSimulator,
    estimator: Estimator,
    generation: u64,
}

impl GameSession {
    /// Associated function to open a new session with a freshly shuffled shoe.
    pub fn new(config: TrainerConfig) -> GameSession {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let shoe = Shoe::new(config.num_decks, &mut rng);
        GameSession::build(config, rng, shoe)
    }

    /// Opens a session on a pre-arranged shoe. Later calls to `reset_deck` and `start_game`
    /// still build random shoes.
    pub fn with_shoe(config: TrainerConfig, shoe: Shoe) -> GameSession {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        GameSession::build(config, rng, shoe)
    }

    fn build(config: TrainerConfig, rng: StdRng, shoe: Shoe) -> GameSession {
        let simulator = OutcomeSimulator::new(config.num_trials);
        let estimator = match config.estimate_mode {
            EstimateMode::Inline => Estimator::Inline,
            EstimateMode::Background => Estimator::Background(EstimateWorker::spawn(simulator)),
        };
        GameSession {
            config,
            rng,
            shoe,
            counter: CardCounter::new(),
            player_hand: Hand::new(),
            dealer_hand: Hand::new(),
            dealer_visible: false,
            chip_count: u64::from(config.starting_chips),
            current_bet: 0,
            pending_bet: None,
            phase: RoundPhase::Betting,
            outcome: None,
            rates: WinRates::default(),
            estimate_pending: false,
            simulator,
            estimator,
            generation: 0,
        }
    }

    /// Updates the bet entry buffer from raw input. Empty input clears it, a non-negative number
    /// replaces it, and anything else is ignored.
    pub fn set_pending_bet(&mut self, input: &str) {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            self.pending_bet = None;
        } else if let Ok(amount) = trimmed.parse::<u32>() {
            self.pending_bet = Some(amount);
        }
    }

    /// Confirms whatever is in the bet entry buffer, an empty buffer is a bet of zero.
    pub fn confirm_pending_bet(&mut self) -> Result<(), BlackjackGameError> {
        let amount = self.pending_bet.unwrap_or(0);
        self.confirm_bet(amount)
    }

    /// Places a bet of `amount` and deals the round. The bet is taken from the chip count
    /// straight away.
    pub fn confirm_bet(&mut self, amount: u32) -> Result<(), BlackjackGameError> {
        if matches!(self.phase, RoundPhase::PlayerTurn | RoundPhase::DealerTurn) {
            return Err(BlackjackGameError::RoundInProgress);
        }
        if amount == 0 {
            return Err(BlackjackGameError::InvalidBet(
                "bet must be a positive amount".to_string(),
            ));
        }
        if u64::from(amount) > self.chip_count {
            return Err(BlackjackGameError::InvalidBet(format!(
                "bet of {} exceeds chip count of {}",
                amount, self.chip_count
            )));
        }
        self.shoe.ensure_available(4)?;

        self.chip_count -= u64::from(amount);
        self.current_bet = amount;
        self.pending_bet = None;
        info!(bet = amount, chips = self.chip_count, "bet placed");
        self.deal()
    }

    /// Deals two cards each, alternating player and dealer. Only the player's cards and the dealer's
    /// up card are counted.
    fn deal(&mut self) -> Result<(), BlackjackGameError> {
        if self.current_bet == 0 {
            return Err(BlackjackGameError::NoBetPlaced);
        }
        self.shoe.ensure_available(4)?;

        self.player_hand.clear();
        self.dealer_hand.clear();
        self.player_hand.receive_card(self.shoe.draw()?);
        self.dealer_hand.receive_card(self.shoe.draw()?);
        self.player_hand.receive_card(self.shoe.draw()?);
        self.dealer_hand.receive_card(self.shoe.draw()?);

        self.dealer_visible = false;
        self.outcome = None;
        self.phase = RoundPhase::PlayerTurn;

        let up_card = &self.dealer_hand.cards()[..1];
        self.counter
            .apply_counts(self.player_hand.cards().iter().chain(up_card));
        debug!(player = %self.player_hand, up_card = %up_card[0], "dealt round");

        self.generation += 1;
        self.request_estimate();
        Ok(())
    }

    /// Deals the player one more card. Going over 21 loses the round on the spot, the dealer's
    /// hand is turned over but the dealer does not draw.
    pub fn hit(&mut self) -> Result<(), BlackjackGameError> {
        if self.current_bet == 0 {
            return Err(BlackjackGameError::NoBetPlaced);
        }
        if self.phase != RoundPhase::PlayerTurn {
            return Err(BlackjackGameError::RoundOver);
        }

        let card = self.shoe.draw()?;
        self.player_hand.receive_card(card);
        self.counter.apply_counts([&card]);
        self.generation += 1;
        debug!(card = %card, player = %self.player_hand, "player hit");

        if self.player_hand.busted() {
            self.reveal_dealer();
            self.finish_round(RoundOutcome::Loss);
        } else {
            self.request_estimate();
        }
        Ok(())
    }

    /// Ends the player's turn. The dealer turns over the hole card, draws to 17 and the round is paid out.
    pub fn stand(&mut self) -> Result<(), BlackjackGameError> {
        if self.current_bet == 0 {
            return Err(BlackjackGameError::NoBetPlaced);
        }
        if self.phase != RoundPhase::PlayerTurn {
            return Err(BlackjackGameError::RoundOver);
        }

        // Play the dealer out on copies so an exhausted shoe leaves the session as it was.
        let mut shoe = self.shoe.clone();
        let mut dealer_hand = self.dealer_hand.clone();
        play_dealer(&mut dealer_hand, &mut shoe)?;

        self.phase = RoundPhase::DealerTurn;
        self.shoe = shoe;
        self.dealer_hand = dealer_hand;
        self.reveal_dealer();
        self.generation += 1;

        let player_total = self.player_hand.value();
        let dealer_total = self.dealer_hand.value();
        let outcome = if dealer_total > BLACKJACK || player_total > dealer_total {
            RoundOutcome::Win
        } else if player_total < dealer_total {
            RoundOutcome::Loss
        } else {
            RoundOutcome::Push
        };
        self.finish_round(outcome);
        Ok(())
    }

    /// Turns the dealer's hand face up and counts every card that was not visible until now.
    fn reveal_dealer(&mut self) {
        if self.dealer_visible {
            return;
        }
        self.dealer_visible = true;
        self.counter
            .apply_counts(self.dealer_hand.cards().iter().skip(1));
        debug!(dealer = %self.dealer_hand, "dealer revealed");
    }

    fn finish_round(&mut self, outcome: RoundOutcome) {
        match outcome {
            RoundOutcome::Win => {
                self.chip_count = self
                    .chip_count
                    .saturating_add(u64::from(self.current_bet) * 2)
            }
            RoundOutcome::Push => {
                self.chip_count = self.chip_count.saturating_add(u64::from(self.current_bet))
            }
            RoundOutcome::Loss => {}
        }
        self.outcome = Some(outcome);
        self.phase = RoundPhase::Settled;
        self.estimate_pending = false;
        info!(
            ?outcome,
            player = self.player_hand.value(),
            dealer = self.dealer_hand.value(),
            chips = self.chip_count,
            "round settled"
        );
    }

    /// Replaces the shoe with a freshly shuffled one and zeroes both counts. Chips, bet and the
    /// hands on the table are left alone.
    pub fn reset_deck(&mut self) {
        self.rebuild_shoe();
        if self.phase == RoundPhase::PlayerTurn {
            self.request_estimate();
        }
    }

    /// Starts over: new shoe, zero counts, starting chips, nothing on the table.
    pub fn start_game(&mut self) {
        self.chip_count = u64::from(self.config.starting_chips);
        self.current_bet = 0;
        self.pending_bet = None;
        self.player_hand.clear();
        self.dealer_hand.clear();
        self.dealer_visible = false;
        self.phase = RoundPhase::Betting;
        self.outcome = None;
        self.rates = WinRates::default();
        self.estimate_pending = false;
        // Bumps the generation, any estimate still in flight for the old hand is now stale.
        self.rebuild_shoe();
        info!(chips = self.chip_count, "new game");
    }

    fn rebuild_shoe(&mut self) {
        self.shoe = Shoe::new(self.config.num_decks, &mut self.rng);
        self.counter.reset();
        self.generation += 1;
        info!(cards = self.shoe.len(), "shoe reshuffled, counts reset");
    }

    fn request_estimate(&mut self) {
        let Some(up_card) = self.dealer_hand.first() else {
            return;
        };
        let request = EstimateRequest {
            generation: self.generation,
            player: self.player_hand.cards().to_vec(),
            up_card,
            unseen: unseen_cards(&self.shoe, &self.dealer_hand, self.dealer_visible),
            seed: self.rng.gen(),
        };

        let inline = match &self.estimator {
            Estimator::Inline => Some(request.run(&self.simulator)),
            Estimator::Background(worker) => {
                match worker.submit(request) {
                    Ok(()) => self.estimate_pending = true,
                    Err(e) => warn!("unable to queue estimate: {}", e),
                }
                None
            }
        };
        if self.estimate_pending {
            // Rates for the previous state no longer describe the table.
            self.rates = WinRates::default();
        }
        if let Some(result) = inline {
            self.apply_estimate(result);
        }
    }

    /// Applies an estimate if it belongs to the current state of the table. Returns false for a
    /// stale result, which is dropped.
    pub(crate) fn apply_estimate(&mut self, result: EstimateResult) -> bool {
        if result.generation != self.generation {
            debug!(
                result = result.generation,
                current = self.generation,
                "discarding stale estimate"
            );
            return false;
        }
        self.estimate_pending = false;
        match result.rates {
            Ok(rates) => self.rates = rates,
            Err(e) => {
                warn!("estimate failed: {}", e);
                self.rates = WinRates::default();
            }
        }
        true
    }

    /// Picks up a finished background estimate, if one is ready for the current state.
    /// Always false in inline mode, where estimates are applied immediately.
    pub fn refresh_rates(&mut self) -> bool {
        let latest = match &self.estimator {
            Estimator::Inline => None,
            Estimator::Background(worker) => worker.try_latest(),
        };
        match latest {
            Some(result) => self.apply_estimate(result),
            None => false,
        }
    }

    /// Waits up to `timeout` for the background estimate of the current state. Returns false
    /// straight away when no estimate is pending.
    pub fn wait_for_rates(&mut self, timeout: Duration) -> bool {
        if !self.estimate_pending {
            return false;
        }
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let result = match &self.estimator {
                Estimator::Inline => return false,
                Estimator::Background(worker) => worker.recv_timeout(deadline - now),
            };
            match result {
                Some(result) => {
                    if self.apply_estimate(result) {
                        return true;
                    }
                }
                None => return false,
            }
        }
    }

    pub fn chip_count(&self) -> u64 {
        self.chip_count
    }

    pub fn current_bet(&self) -> u32 {
        self.current_bet
    }

    pub fn pending_bet(&self) -> Option<u32> {
        self.pending_bet
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn game_over(&self) -> bool {
        self.phase == RoundPhase::Settled
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    /// `Some(true)` for a win, `Some(false)` for a loss, `None` for a push or an unfinished round.
    pub fn player_won(&self) -> Option<bool> {
        match self.outcome {
            Some(RoundOutcome::Win) => Some(true),
            Some(RoundOutcome::Loss) => Some(false),
            Some(RoundOutcome::Push) | None => None,
        }
    }

    pub fn player_hand(&self) -> &Hand {
        &self.player_hand
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer_hand
    }

    pub fn dealer_visible(&self) -> bool {
        self.dealer_visible
    }

    pub fn deck_size(&self) -> usize {
        self.shoe.len()
    }

    pub fn hi_lo_count(&self) -> i32 {
        self.counter.hi_lo_count()
    }

    pub fn hi_opt_ii_count(&self) -> i32 {
        self.counter.hi_opt_ii_count()
    }

    pub fn cards_counted(&self) -> usize {
        self.counter.cards_counted()
    }

    pub fn rates(&self) -> WinRates {
        self.rates
    }

    /// True while a background estimate for the current state has not been picked up yet.
    pub fn estimate_pending(&self) -> bool {
        self.estimate_pending
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Everything a renderer needs, with the dealer's hole card masked until it is revealed.
    pub fn snapshot(&self) -> TableSnapshot {
        let dealer_hand = self
            .dealer_hand
            .cards()
            .iter()
            .enumerate()
            .map(|(i, card)| {
                if i == 0 || self.dealer_visible {
                    CardView::shown(card)
                } else {
                    CardView::hidden()
                }
            })
            .collect();

        TableSnapshot {
            phase: self.phase,
            player_hand: self.player_hand.cards().iter().map(CardView::shown).collect(),
            player_total: self.player_hand.value(),
            dealer_hand,
            dealer_total: if self.dealer_visible {
                Some(self.dealer_hand.value())
            } else {
                None
            },
            dealer_visible: self.dealer_visible,
            chip_count: self.chip_count,
            current_bet: self.current_bet,
            pending_bet: self.pending_bet,
            deck_size: self.shoe.len(),
            hi_lo_count: self.counter.hi_lo_count(),
            hi_opt_ii_count: self.counter.hi_opt_ii_count(),
            hi_lo_true_count: self.counter.hi_lo_true_count(self.shoe.len()),
            game_over: self.game_over(),
            player_won: self.player_won(),
            outcome: self.outcome,
            estimate_pending: self.estimate_pending,
            win_rate: self.rates.win_rate,
            push_rate: self.rates.push_rate,
        }
    }
}
