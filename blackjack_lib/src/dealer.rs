use crate::hand::Hand;
use crate::shoe::CardSource;
use crate::BlackjackGameError;

/// The dealer keeps drawing while the hand is below this total.
pub const DEALER_STANDS_ON: u8 = 17;

/// Plays out the dealer's hand, drawing from `source` while the total is under 17.
/// The dealer stands on every 17, soft or hard. Returns the number of cards drawn.
pub fn play_dealer<S: CardSource + ?Sized>(
    hand: &mut Hand,
    source: &mut S,
) -> Result<usize, BlackjackGameError> {
    let mut drawn = 0;
    while hand.value() < DEALER_STANDS_ON {
        hand.receive_card(source.draw()?);
        drawn += 1;
    }
    Ok(drawn)
}
