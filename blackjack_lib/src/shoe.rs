use crate::card::{Card, Rank, Suit};
use crate::BlackjackGameError;
use rand::Rng;
use tracing::debug;

/// Number of cards in a single standard deck.
pub const CARDS_PER_DECK: usize = 52;

/// Trait for anything the dealer can draw cards from. Implemented by `Shoe` for live play
/// and by the simulator's trial pool, so the same dealer policy drives both.
pub trait CardSource {
    /// Removes and returns the next card, or `BlackjackGameError::EmptyShoe` if none remain.
    fn draw(&mut self) -> Result<Card, BlackjackGameError>;
}

/// Builds `num_decks` standard decks back to back, in suit then rank order. The result is not shuffled.
pub fn build_shoe(num_decks: usize) -> Vec<Card> {
    let mut cards = Vec::with_capacity(num_decks * CARDS_PER_DECK);
    for _ in 0..num_decks {
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
    }
    cards
}

/// Uniform Fisher-Yates shuffle, walking from the last index down to 1 and swapping each
/// position with a uniformly chosen position at or below it.
pub fn shuffle<T, R: Rng + ?Sized>(cards: &mut [T], rng: &mut R) {
    for i in (1..cards.len()).rev() {
        let j = rng.gen_range(0..=i);
        cards.swap(i, j);
    }
}

/// The shoe of undealt cards. Cards are drawn from the back of the underlying vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shoe {
    cards: Vec<Card>,
    num_decks: usize,
}

impl Shoe {
    /// Associated function that builds a freshly shuffled shoe of `num_decks` decks.
    pub fn new<R: Rng + ?Sized>(num_decks: usize, rng: &mut R) -> Shoe {
        let mut cards = build_shoe(num_decks);
        shuffle(&mut cards, rng);
        debug!(num_decks, cards = cards.len(), "built new shoe");
        Shoe { cards, num_decks }
    }

    /// Builds a shoe in exactly the given order, the last card of `cards` is the first one drawn.
    /// Intended for stacking the shoe in tests and scripted scenarios.
    pub fn from_cards(cards: Vec<Card>) -> Shoe {
        let num_decks = (cards.len() + CARDS_PER_DECK - 1) / CARDS_PER_DECK;
        Shoe { cards, num_decks }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn num_decks(&self) -> usize {
        self.num_decks
    }

    /// The undealt cards, in draw order reversed (the last element is next).
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Checks that at least `n` cards remain, so callers can validate a multi-card draw
    /// before mutating anything.
    pub fn ensure_available(&self, n: usize) -> Result<(), BlackjackGameError> {
        if self.cards.len() < n {
            return Err(BlackjackGameError::EmptyShoe);
        }
        Ok(())
    }
}

impl CardSource for Shoe {
    fn draw(&mut self) -> Result<Card, BlackjackGameError> {
        self.cards.pop().ok_or(BlackjackGameError::EmptyShoe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn five_deck_shoe_has_260_cards() {
        let cards = build_shoe(5);
        assert_eq!(cards.len(), 260);

        let mut ranks: HashMap<Rank, usize> = HashMap::new();
        let mut suits: HashMap<Suit, usize> = HashMap::new();
        for card in &cards {
            *ranks.entry(card.rank()).or_insert(0) += 1;
            *suits.entry(card.suit()).or_insert(0) += 1;
        }
        assert_eq!(ranks.len(), 13);
        assert!(ranks.values().all(|&n| n == 20));
        assert_eq!(suits.len(), 4);
        assert!(suits.values().all(|&n| n == 65));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let original = build_shoe(2);
        let mut shuffled = original.clone();
        shuffle(&mut shuffled, &mut rng);

        assert_eq!(shuffled.len(), original.len());
        assert_ne!(shuffled, original);

        let mut a = original.clone();
        let mut b = shuffled.clone();
        a.sort_by_key(|c| (c.suit(), c.rank()));
        b.sort_by_key(|c| (c.suit(), c.rank()));
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_handles_tiny_slices() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty: Vec<Card> = vec![];
        shuffle(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let card = Card::new(Rank::Ace, Suit::Spades);
        let mut single = vec![card];
        shuffle(&mut single, &mut rng);
        assert_eq!(single, vec![card]);
    }

    #[test]
    fn draw_takes_from_the_back() {
        let first = Card::new(Rank::Two, Suit::Hearts);
        let second = Card::new(Rank::King, Suit::Clubs);
        let mut shoe = Shoe::from_cards(vec![first, second]);

        assert_eq!(shoe.draw(), Ok(second));
        assert_eq!(shoe.draw(), Ok(first));
        assert_eq!(shoe.draw(), Err(BlackjackGameError::EmptyShoe));
        assert!(shoe.is_empty());
    }

    #[test]
    fn ensure_available_reports_short_shoe() {
        let shoe = Shoe::from_cards(vec![Card::new(Rank::Five, Suit::Clubs)]);
        assert!(shoe.ensure_available(1).is_ok());
        assert_eq!(shoe.ensure_available(2), Err(BlackjackGameError::EmptyShoe));
    }

    #[test]
    fn new_shoe_is_full_and_shuffled() {
        let mut rng = StdRng::seed_from_u64(42);
        let shoe = Shoe::new(5, &mut rng);
        assert_eq!(shoe.len(), 260);
        assert_eq!(shoe.num_decks(), 5);
        assert_ne!(shoe.cards(), build_shoe(5).as_slice());
    }
}
