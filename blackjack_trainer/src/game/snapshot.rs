use super::{RoundOutcome, RoundPhase};
use blackjack_lib::Card;
use serde::Serialize;

/// A card as the player sees it. Face-down cards carry no rank, suit or image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub visible: bool,
    pub rank: Option<String>,
    pub suit: Option<String>,
    pub image: Option<String>,
}

impl CardView {
    pub fn shown(card: &Card) -> CardView {
        CardView {
            visible: true,
            rank: Some(card.rank().name().to_string()),
            suit: Some(card.suit().name().to_string()),
            image: Some(card.image_name()),
        }
    }

    pub fn hidden() -> CardView {
        CardView {
            visible: false,
            rank: None,
            suit: None,
            image: None,
        }
    }
}

/// Read-only view of the table handed to the terminal renderer and serialized by the HTTP surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub phase: RoundPhase,
    pub player_hand: Vec<CardView>,
    pub player_total: u8,
    pub dealer_hand: Vec<CardView>,
    /// Only known once the hole card is turned over.
    pub dealer_total: Option<u8>,
    pub dealer_visible: bool,
    pub chip_count: u64,
    pub current_bet: u32,
    pub pending_bet: Option<u32>,
    pub deck_size: usize,
    pub hi_lo_count: i32,
    pub hi_opt_ii_count: i32,
    pub hi_lo_true_count: f32,
    pub game_over: bool,
    pub player_won: Option<bool>,
    pub outcome: Option<RoundOutcome>,
    /// The win and push rates are zero until the pending estimate arrives.
    pub estimate_pending: bool,
    pub win_rate: f64,
    pub push_rate: f64,
}
