//! Core blackjack types: cards, the multi-deck shoe, hand valuation, running card counts and
//! the dealer's drawing rule. Nothing in this crate performs I/O.

pub mod card;
pub mod counting;
pub mod dealer;
pub mod hand;
pub mod shoe;

use thiserror::Error;

pub use card::{Card, Rank, Suit};
pub use counting::{CardCounter, CountingStrategy, HiLo, HiOptII};
pub use dealer::{play_dealer, DEALER_STANDS_ON};
pub use hand::{hand_value, is_natural, Hand, BLACKJACK};
pub use shoe::{build_shoe, shuffle, CardSource, Shoe, CARDS_PER_DECK};

pub mod prelude {
    pub use super::{
        build_shoe, hand_value, is_natural, play_dealer, shuffle, BlackjackGameError, Card,
        CardCounter, CardSource, CountingStrategy, Hand, HiLo, HiOptII, Rank, Shoe, Suit,
        BLACKJACK, DEALER_STANDS_ON,
    };
}

/// Errors produced by the game. Everything except `EmptyShoe` is a rejected user command and
/// leaves the game untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackjackGameError {
    #[error("invalid bet: {0}")]
    InvalidBet(String),
    #[error("no bet has been placed")]
    NoBetPlaced,
    #[error("a round is already in progress")]
    RoundInProgress,
    #[error("the round is over, place a new bet")]
    RoundOver,
    #[error("the shoe is out of cards")]
    EmptyShoe,
}

impl BlackjackGameError {
    /// True for errors caused by the user's input rather than by the state of the shoe.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, BlackjackGameError::EmptyShoe)
    }
}
