//! Monte-Carlo estimate of the player's chances from the position they can currently see.
//! Every trial finishes the dealer's hand from the known up card using the cards the player has
//! not seen, then compares the result with the player's current total.

pub mod worker;

use blackjack_lib::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

/// Number of trials run for every estimate unless configured otherwise.
pub const DEFAULT_TRIALS: u32 = 10_000;

/// Trials are grouped into batches of this size, each batch runs on one rayon task with its own rng.
const TRIALS_PER_BATCH: u32 = 1_000;

/// Win and push probabilities as percentages in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WinRates {
    pub win_rate: f64,
    pub push_rate: f64,
}

impl WinRates {
    /// Whatever is neither a win nor a push is a loss.
    pub fn loss_rate(&self) -> f64 {
        f64::max(100.0 - self.win_rate - self.push_rate, 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrialOutcome {
    Win,
    Push,
    Loss,
}

/// Classifies a finished trial. A player natural only loses its edge to a dealer natural,
/// otherwise the higher total wins and a dealer bust is always a player win.
fn classify(player_total: u8, player_natural: bool, dealer: &Hand) -> TrialOutcome {
    let dealer_total = dealer.value();
    if player_natural {
        if dealer.is_natural() {
            TrialOutcome::Push
        } else {
            TrialOutcome::Win
        }
    } else if dealer_total > BLACKJACK || player_total > dealer_total {
        TrialOutcome::Win
    } else if player_total == dealer_total {
        TrialOutcome::Push
    } else {
        TrialOutcome::Loss
    }
}

/// A view over the unseen cards for one trial. Each draw picks uniformly among the cards not yet
/// drawn in this trial and moves it to the front, which is a Fisher-Yates shuffle performed only as
/// far as the trial needs. The slice can be reused across trials without being restored, any
/// arrangement of it is an equally good starting point.
struct TrialPool<'a, R: Rng> {
    cards: &'a mut [Card],
    drawn: usize,
    rng: &'a mut R,
}

impl<'a, R: Rng> TrialPool<'a, R> {
    fn new(cards: &'a mut [Card], rng: &'a mut R) -> Self {
        TrialPool {
            cards,
            drawn: 0,
            rng,
        }
    }
}

impl<'a, R: Rng> CardSource for TrialPool<'a, R> {
    fn draw(&mut self) -> Result<Card, BlackjackGameError> {
        if self.drawn >= self.cards.len() {
            return Err(BlackjackGameError::EmptyShoe);
        }
        let j = self.rng.gen_range(self.drawn..self.cards.len());
        self.cards.swap(self.drawn, j);
        let card = self.cards[self.drawn];
        self.drawn += 1;
        Ok(card)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    wins: u32,
    pushes: u32,
}

impl std::ops::Add for Tally {
    type Output = Tally;

    fn add(self, other: Tally) -> Tally {
        Tally {
            wins: self.wins + other.wins,
            pushes: self.pushes + other.pushes,
        }
    }
}

/// Struct for running the Monte-Carlo outcome estimate.
#[derive(Debug, Clone, Copy)]
pub struct OutcomeSimulator {
    trials: u32,
}

impl OutcomeSimulator {
    pub fn new(trials: u32) -> OutcomeSimulator {
        OutcomeSimulator { trials }
    }

    pub fn trials(&self) -> u32 {
        self.trials
    }

    /// Estimates the player's win and push rates for standing on `player` against a dealer showing
    /// `up_card`, drawing the dealer's remaining cards from `unseen`. The seed for the trials is
    /// taken from `rng`.
    pub fn estimate_rates<R: Rng + ?Sized>(
        &self,
        player: &[Card],
        up_card: Card,
        unseen: &[Card],
        rng: &mut R,
    ) -> Result<WinRates, BlackjackGameError> {
        let seed = rng.gen();
        self.estimate_with_seed(player, up_card, unseen, seed)
    }

    /// Same as `estimate_rates` but fully determined by `seed`, regardless of how rayon schedules
    /// the batches.
    pub fn estimate_with_seed(
        &self,
        player: &[Card],
        up_card: Card,
        unseen: &[Card],
        seed: u64,
    ) -> Result<WinRates, BlackjackGameError> {
        if self.trials == 0 {
            return Ok(WinRates::default());
        }

        let player_total = hand_value(player);
        let player_natural = is_natural(player);

        let mut seeder = SmallRng::seed_from_u64(seed);
        let mut batches = Vec::new();
        let mut remaining = self.trials;
        while remaining > 0 {
            let size = u32::min(remaining, TRIALS_PER_BATCH);
            batches.push((seeder.gen::<u64>(), size));
            remaining -= size;
        }

        let tallies = batches
            .into_par_iter()
            .map(|(batch_seed, size)| {
                run_batch(player_total, player_natural, up_card, unseen, batch_seed, size)
            })
            .collect::<Result<Vec<Tally>, BlackjackGameError>>()?;
        let tally = tallies.into_iter().fold(Tally::default(), |acc, t| acc + t);

        let trials = self.trials as f64;
        Ok(WinRates {
            win_rate: (tally.wins as f64) / trials * 100.0,
            push_rate: (tally.pushes as f64) / trials * 100.0,
        })
    }
}

impl Default for OutcomeSimulator {
    fn default() -> Self {
        OutcomeSimulator::new(DEFAULT_TRIALS)
    }
}

fn run_batch(
    player_total: u8,
    player_natural: bool,
    up_card: Card,
    unseen: &[Card],
    seed: u64,
    trials: u32,
) -> Result<Tally, BlackjackGameError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut working = unseen.to_vec();
    let mut tally = Tally::default();
    let mut dealer = Hand::new();

    for _ in 0..trials {
        let mut pool = TrialPool::new(&mut working, &mut rng);
        dealer.clear();
        dealer.receive_card(up_card);
        dealer.receive_card(pool.draw()?);
        play_dealer(&mut dealer, &mut pool)?;

        match classify(player_total, player_natural, &dealer) {
            TrialOutcome::Win => tally.wins += 1,
            TrialOutcome::Push => tally.pushes += 1,
            TrialOutcome::Loss => {}
        }
    }

    Ok(tally)
}

/// The cards the player cannot see: everything left in the shoe, plus the dealer's hole card
/// while it is still face down.
pub fn unseen_cards(shoe: &Shoe, dealer: &Hand, dealer_visible: bool) -> Vec<Card> {
    let mut unseen = shoe.cards().to_vec();
    if !dealer_visible {
        unseen.extend(dealer.cards().iter().skip(1).copied());
    }
    unseen
}
