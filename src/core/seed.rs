use crate::player::Player;

/// Demo roster written on first run.
pub fn demo_roster() -> Vec<Player> {
    vec![
        Player::with_totals(1, "Alice", 850, 23),
        Player::with_totals(2, "Bob", 765, 19),
        Player::with_totals(3, "Charlie", 910, 27),
        Player::with_totals(4, "Diana", 820, 21),
        Player::with_totals(5, "Ethan", 780, 18),
    ]
}
