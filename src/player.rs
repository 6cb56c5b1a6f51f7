//! Roster entry type.

use serde::{Deserialize, Serialize};

use crate::types::{PlayerId, Points};

/// A player on the roster with running totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Stable player identifier.
    pub id: PlayerId,
    /// Display name. Not required to be unique.
    pub name: String,
    /// Accumulated points.
    pub points: Points,
    /// Number of matches credited to this player.
    pub games_played: u32,
}

impl Player {
    /// Creates a player with zeroed totals.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self::with_totals(id, name, 0, 0)
    }

    /// Creates a player with preset totals.
    pub fn with_totals(id: PlayerId, name: impl Into<String>, points: Points, games_played: u32) -> Self {
        Self {
            id,
            name: name.into(),
            points,
            games_played,
        }
    }

    /// Sets the points total and moves the games counter by `games`.
    ///
    /// The games counter saturates at zero.
    pub(crate) fn set_totals(&mut self, points: Points, games: i32) {
        self.points = points;
        self.games_played = self.games_played.saturating_add_signed(games);
    }
}
