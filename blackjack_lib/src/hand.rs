use crate::card::Card;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Highest total a hand can have without busting.
pub const BLACKJACK: u8 = 21;

/// Computes the best blackjack total for `cards`. Aces start at 11 and are reduced to 1 one at a time
/// while the total is over 21. If every ace has been reduced and the hand is still over 21 the
/// smallest bust total is returned.
pub fn hand_value(cards: &[Card]) -> u8 {
    let (total, _) = best_total(cards);
    u8::try_from(total).unwrap_or(u8::MAX)
}

/// Returns the best total along with the number of aces still counted as 11.
fn best_total(cards: &[Card]) -> (u16, usize) {
    let mut total: u16 = cards.iter().map(|c| c.value() as u16).sum();
    let mut soft_aces = cards.iter().filter(|c| c.is_ace()).count();
    while total > BLACKJACK as u16 && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    (total, soft_aces)
}

/// A natural is exactly two cards totalling 21.
pub fn is_natural(cards: &[Card]) -> bool {
    cards.len() == 2 && hand_value(cards) == BLACKJACK
}

/// An ordered hand of cards belonging to either the player or the dealer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand { cards: Vec::new() }
    }

    pub fn from_cards(cards: Vec<Card>) -> Hand {
        Hand { cards }
    }

    /// Method for receiving a card, appends `card` to the end of the hand.
    pub fn receive_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The first card dealt to the hand, for the dealer this is the face up card.
    pub fn first(&self) -> Option<Card> {
        self.cards.first().copied()
    }

    pub fn value(&self) -> u8 {
        hand_value(&self.cards)
    }

    pub fn is_natural(&self) -> bool {
        is_natural(&self.cards)
    }

    /// True when the best total still counts an ace as 11.
    pub fn is_soft(&self) -> bool {
        let (total, soft_aces) = best_total(&self.cards);
        soft_aces > 0 && total <= BLACKJACK as u16
    }

    pub fn busted(&self) -> bool {
        self.value() > BLACKJACK
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cards = self
            .cards
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        if self.is_soft() {
            write!(f, "[{}] (soft {})", cards, self.value())
        } else {
            write!(f, "[{}] ({})", cards, self.value())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};

    fn cards(ranks: &[Rank]) -> Vec<Card> {
        ranks.iter().map(|&r| Card::new(r, Suit::Spades)).collect()
    }

    #[test]
    fn two_aces_and_a_nine_make_21() {
        assert_eq!(hand_value(&cards(&[Rank::Ace, Rank::Ace, Rank::Nine])), 21);
    }

    #[test]
    fn three_aces_make_13() {
        assert_eq!(hand_value(&cards(&[Rank::Ace, Rank::Ace, Rank::Ace])), 13);
    }

    #[test]
    fn bust_returns_the_minimal_total() {
        assert_eq!(hand_value(&cards(&[Rank::King, Rank::Nine, Rank::Five])), 24);
        assert_eq!(
            hand_value(&cards(&[Rank::Ace, Rank::King, Rank::Nine, Rank::Five])),
            25
        );
    }

    #[test]
    fn empty_hand_is_zero() {
        assert_eq!(hand_value(&[]), 0);
    }

    #[test]
    fn soft_and_hard_totals() {
        let soft = Hand::from_cards(cards(&[Rank::Ace, Rank::Six]));
        assert_eq!(soft.value(), 17);
        assert!(soft.is_soft());

        let hard = Hand::from_cards(cards(&[Rank::Ace, Rank::Six, Rank::Ten]));
        assert_eq!(hard.value(), 17);
        assert!(!hard.is_soft());
        assert!(!hard.busted());
    }

    #[test]
    fn naturals_need_exactly_two_cards() {
        assert!(is_natural(&cards(&[Rank::Ace, Rank::Queen])));
        assert!(!is_natural(&cards(&[Rank::Seven, Rank::Seven, Rank::Seven])));
        assert!(!is_natural(&cards(&[Rank::Ace, Rank::Nine])));
    }

    #[test]
    fn receive_card_keeps_order() {
        let mut hand = Hand::new();
        let a = Card::new(Rank::Four, Suit::Hearts);
        let b = Card::new(Rank::Jack, Suit::Clubs);
        hand.receive_card(a);
        hand.receive_card(b);
        assert_eq!(hand.cards(), &[a, b]);
        assert_eq!(hand.first(), Some(a));
        assert_eq!(hand.value(), 14);
    }
}
