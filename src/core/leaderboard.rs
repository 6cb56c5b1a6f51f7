use std::{cmp::Reverse, slice};

use crate::player::Player;

/// Roster ranked by points, highest first.
///
/// Ties keep roster order. Iterate as many times as needed; each call to
/// [`Leaderboard::iter`] starts from the top.
#[derive(Debug, Clone)]
pub struct Leaderboard<'a> {
    players: &'a [Player],
    order: Vec<usize>,
}

impl<'a> Leaderboard<'a> {
    pub(crate) fn new(players: &'a [Player]) -> Self {
        let mut order: Vec<usize> = (0..players.len()).collect();
        // stable: equal points stay in roster order
        order.sort_by_key(|idx| Reverse(players[*idx].points));
        Self { players, order }
    }

    /// Ranked players, best first.
    pub fn iter(&self) -> Ranked<'a, '_> {
        Ranked {
            players: self.players,
            order: self.order.iter(),
        }
    }

    /// Number of ranked players.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Clones the ranking into an owned list.
    pub fn to_vec(&self) -> Vec<Player> {
        self.iter().cloned().collect()
    }
}

impl<'a, 'b> IntoIterator for &'b Leaderboard<'a> {
    type Item = &'a Player;
    type IntoIter = Ranked<'a, 'b>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`Leaderboard`].
#[derive(Debug, Clone)]
pub struct Ranked<'a, 'b> {
    players: &'a [Player],
    order: slice::Iter<'b, usize>,
}

impl<'a> Iterator for Ranked<'a, '_> {
    type Item = &'a Player;

    fn next(&mut self) -> Option<Self::Item> {
        let players = self.players;
        self.order.next().map(|idx| &players[*idx])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl ExactSizeIterator for Ranked<'_, '_> {}
