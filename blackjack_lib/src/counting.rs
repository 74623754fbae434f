//! Running card counts. Each counting system assigns a weight to every rank, and the running
//! count is the sum of the weights of every card the player has seen since the last shuffle.

use crate::card::{Card, Rank};
use crate::shoe::CARDS_PER_DECK;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::Display;
use tracing::debug;

lazy_static! {
    static ref HI_LO_WEIGHTS: HashMap<Rank, i32> = {
        let mut table = HashMap::new();
        for rank in [Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six] {
            table.insert(rank, 1);
        }
        for rank in [Rank::Seven, Rank::Eight, Rank::Nine] {
            table.insert(rank, 0);
        }
        for rank in [Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace] {
            table.insert(rank, -1);
        }
        table
    };
    static ref HI_OPT_II_WEIGHTS: HashMap<Rank, i32> = {
        let mut table = HashMap::new();
        for rank in [Rank::Two, Rank::Three, Rank::Six, Rank::Seven, Rank::Nine] {
            table.insert(rank, 1);
        }
        table.insert(Rank::Four, 2);
        table.insert(Rank::Five, 2);
        table.insert(Rank::Eight, 0);
        for rank in [Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace] {
            table.insert(rank, -2);
        }
        table
    };
}

/// Trait for a specific counting strategy. Implementers keep a running count that is only ever
/// updated one card at a time, and cleared when the shoe is rebuilt.
pub trait CountingStrategy {
    /// The weight this system assigns to `rank`.
    fn weight(&self, rank: Rank) -> i32;
    /// Folds a newly visible card into the running count.
    fn update(&mut self, card: &Card);
    fn running_count(&self) -> i32;
    fn reset(&mut self);

    /// Running count divided by the number of decks still in the shoe. The remaining decks are
    /// floored at half a deck so the count does not explode at the end of a shoe.
    fn true_count(&self, cards_remaining: usize) -> f32 {
        let decks_remaining = f32::max(cards_remaining as f32 / CARDS_PER_DECK as f32, 0.5);
        self.running_count() as f32 / decks_remaining
    }
}

/// The Hi-Lo counting system: 2 through 6 count +1, 7 through 9 count 0, tens and aces count -1.
pub struct HiLo {
    running_count: i32,
    lookup_table: &'static HashMap<Rank, i32>,
}

impl HiLo {
    pub fn new() -> HiLo {
        HiLo {
            running_count: 0,
            lookup_table: &HI_LO_WEIGHTS,
        }
    }
}

impl Default for HiLo {
    fn default() -> Self {
        HiLo::new()
    }
}

impl CountingStrategy for HiLo {
    fn weight(&self, rank: Rank) -> i32 {
        self.lookup_table.get(&rank).copied().unwrap_or(0)
    }

    fn update(&mut self, card: &Card) {
        self.running_count += self.weight(card.rank());
    }

    fn running_count(&self) -> i32 {
        self.running_count
    }

    fn reset(&mut self) {
        self.running_count = 0;
    }
}

/// The Hi-Opt II counting system as the trainer displays it: 2, 3, 6, 7 and 9 count +1,
/// 4 and 5 count +2, 8 counts 0, tens and aces count -2.
pub struct HiOptII {
    running_count: i32,
    lookup_table: &'static HashMap<Rank, i32>,
}

impl HiOptII {
    pub fn new() -> HiOptII {
        HiOptII {
            running_count: 0,
            lookup_table: &HI_OPT_II_WEIGHTS,
        }
    }
}

impl Default for HiOptII {
    fn default() -> Self {
        HiOptII::new()
    }
}

impl CountingStrategy for HiOptII {
    fn weight(&self, rank: Rank) -> i32 {
        self.lookup_table.get(&rank).copied().unwrap_or(0)
    }

    fn update(&mut self, card: &Card) {
        self.running_count += self.weight(card.rank());
    }

    fn running_count(&self) -> i32 {
        self.running_count
    }

    fn reset(&mut self) {
        self.running_count = 0;
    }
}

/// Struct that keeps both counts the trainer displays, plus how many cards have been counted.
#[derive(Default)]
pub struct CardCounter {
    hi_lo: HiLo,
    hi_opt_ii: HiOptII,
    cards_counted: usize,
}

impl CardCounter {
    pub fn new() -> CardCounter {
        CardCounter::default()
    }

    /// Adds every card in `cards` to both running counts. Each card must be passed exactly once,
    /// at the moment it becomes visible to the player.
    pub fn apply_counts<'a, I: IntoIterator<Item = &'a Card>>(&mut self, cards: I) {
        for card in cards {
            self.hi_lo.update(card);
            self.hi_opt_ii.update(card);
            self.cards_counted += 1;
            debug!(
                card = %card,
                hi_lo = self.hi_lo.running_count(),
                hi_opt_ii = self.hi_opt_ii.running_count(),
                "counted card"
            );
        }
    }

    pub fn hi_lo_count(&self) -> i32 {
        self.hi_lo.running_count()
    }

    pub fn hi_opt_ii_count(&self) -> i32 {
        self.hi_opt_ii.running_count()
    }

    pub fn hi_lo_true_count(&self, cards_remaining: usize) -> f32 {
        self.hi_lo.true_count(cards_remaining)
    }

    pub fn cards_counted(&self) -> usize {
        self.cards_counted
    }

    pub fn reset(&mut self) {
        self.hi_lo.reset();
        self.hi_opt_ii.reset();
        self.cards_counted = 0;
    }
}

impl Display for CardCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = "hi-opt ii count:".len() + 4;
        write!(
            f,
            "{:<width$}{:>6}\n{:<width$}{:>6}\n{:<width$}{:>6}",
            "hi-lo count:",
            self.hi_lo_count(),
            "hi-opt ii count:",
            self.hi_opt_ii_count(),
            "cards counted:",
            self.cards_counted,
        )
    }
}
