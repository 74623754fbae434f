use crate::game::snapshot::{CardView, TableSnapshot};
use crate::game::{RoundOutcome, RoundPhase};
use std::io::Write;

const WIDTH: usize = 60;
const TEXT_WIDTH: usize = "hi-opt ii running count".len() + 8;
const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;

fn format_cards(cards: &[CardView]) -> String {
    if cards.is_empty() {
        return String::from("(none)");
    }
    cards
        .iter()
        .map(|card| match (&card.rank, &card.suit) {
            (Some(rank), Some(suit)) if card.visible => format!("{} of {}", rank, suit),
            _ => String::from("[hidden]"),
        })
        .collect::<Vec<String>>()
        .join(", ")
}

fn status_line(snapshot: &TableSnapshot) -> String {
    match (snapshot.phase, snapshot.outcome) {
        (RoundPhase::Betting, _) => String::from("place a bet to deal"),
        (RoundPhase::PlayerTurn, _) => String::from("hit or stand"),
        (RoundPhase::DealerTurn, _) => String::from("dealer is playing"),
        (RoundPhase::Settled, Some(RoundOutcome::Win)) => {
            format!("you win {}", snapshot.current_bet * 2)
        }
        (RoundPhase::Settled, Some(RoundOutcome::Push)) => {
            format!("push, {} returned", snapshot.current_bet)
        }
        (RoundPhase::Settled, _) => format!("you lose {}", snapshot.current_bet),
    }
}

/// Renders the table as the block of text printed after every command.
pub fn render_table(snapshot: &TableSnapshot) -> String {
    let mut out = format!("{:-^WIDTH$}\n", " table ");

    let dealer_total = match snapshot.dealer_total {
        Some(total) => total.to_string(),
        None => String::from("?"),
    };
    out.push_str(&format!(
        "dealer ({}): {}\n",
        dealer_total,
        format_cards(&snapshot.dealer_hand)
    ));
    out.push_str(&format!(
        "player ({}): {}\n",
        snapshot.player_total,
        format_cards(&snapshot.player_hand)
    ));
    out.push_str(&format!("{}\n", "-".repeat(WIDTH)));

    let pending = snapshot
        .pending_bet
        .map(|bet| bet.to_string())
        .unwrap_or_else(|| String::from("-"));
    let rows: [(&str, String); 9] = [
        ("chips", snapshot.chip_count.to_string()),
        ("current bet", snapshot.current_bet.to_string()),
        ("pending bet", pending),
        ("cards left in shoe", snapshot.deck_size.to_string()),
        ("hi-lo running count", snapshot.hi_lo_count.to_string()),
        ("hi-lo true count", format!("{:.2}", snapshot.hi_lo_true_count)),
        ("hi-opt ii running count", snapshot.hi_opt_ii_count.to_string()),
        ("win chance", format!("{:.2}%", snapshot.win_rate)),
        ("push chance", format!("{:.2}%", snapshot.push_rate)),
    ];
    for (label, value) in rows.iter() {
        out.push_str(&format!(
            "{:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n",
            label,
            value
        ));
    }

    out.push_str(&format!("{}\n", "-".repeat(WIDTH)));
    out.push_str(&format!("{}\n", status_line(snapshot)));
    out
}

/// Writes the rendered table to `writer`.
pub fn write_table(mut writer: impl Write, snapshot: &TableSnapshot) -> std::io::Result<()> {
    writer.write_all(render_table(snapshot).as_bytes())?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameSession;
    use crate::TrainerConfig;
    use blackjack_lib::{Card, Rank, Shoe, Suit};

    fn session() -> GameSession {
        let mut cards: Vec<Card> = (0..20).map(|_| Card::new(Rank::Two, Suit::Clubs)).collect();
        for rank in [Rank::King, Rank::Nine, Rank::Seven, Rank::Ten] {
            cards.push(Card::new(rank, Suit::Spades));
        }
        let config = TrainerConfig::new().num_trials(500).seed(3).build();
        GameSession::with_shoe(config, Shoe::from_cards(cards))
    }

    #[test]
    fn hole_card_is_not_rendered() {
        let mut session = session();
        session.confirm_bet(100).unwrap();
        let text = render_table(&session.snapshot());

        assert!(text.contains("dealer (?): 7 of Spades, [hidden]"));
        assert!(text.contains("player (19): 10 of Spades, 9 of Spades"));
        assert!(!text.contains("King"));
        assert!(text.contains("hit or stand"));
    }

    #[test]
    fn settled_round_shows_dealer_and_result() {
        let mut session = session();
        session.confirm_bet(100).unwrap();
        session.stand().unwrap();
        let text = render_table(&session.snapshot());

        assert!(text.contains("dealer (17): 7 of Spades, King of Spades"));
        assert!(text.contains("you win 200"));
    }

    #[test]
    fn rows_are_aligned_to_the_table_width() {
        let session = session();
        let text = render_table(&session.snapshot());
        let chips_line = text
            .lines()
            .find(|line| line.starts_with("chips"))
            .unwrap();
        assert_eq!(chips_line.len(), WIDTH);
        assert!(chips_line.ends_with("1000"));
        assert!(text.contains("(none)"));
        assert!(text.contains("place a bet to deal"));
    }

    #[test]
    fn write_table_writes_the_rendered_text() {
        let session = session();
        let mut buffer: Vec<u8> = Vec::new();
        write_table(&mut buffer, &session.snapshot()).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), render_table(&session.snapshot()));
    }
}
