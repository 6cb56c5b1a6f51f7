//! Match history records and validated match entries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{MatchId, PlayerId, Points};

/// Maximum number of players credited by one match.
pub const MAX_PLAYERS_PER_MATCH: usize = 2;

/// Input rejected before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Fewer than one or more than two players were selected.
    #[error("Select 1 or 2 players for the match.")]
    PlayerCount {
        /// Number of ids supplied.
        count: usize,
    },
    /// Points were zero or negative.
    #[error("Enter valid points.")]
    NonPositivePoints {
        /// Rejected value.
        points: Points,
    },
    /// The same player was listed twice.
    #[error("Player {id} is listed more than once.")]
    DuplicatePlayer {
        /// Repeated id.
        id: PlayerId,
    },
}

/// Validated `(players, points)` pair shared by recording and editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEntry {
    player_ids: Vec<PlayerId>,
    points: Points,
}

impl MatchEntry {
    /// Validates and builds an entry.
    pub fn new(player_ids: Vec<PlayerId>, points: Points) -> Result<Self, ValidationError> {
        let count = player_ids.len();
        if count == 0 || count > MAX_PLAYERS_PER_MATCH {
            return Err(ValidationError::PlayerCount { count });
        }
        if points <= 0 {
            return Err(ValidationError::NonPositivePoints { points });
        }
        for (idx, id) in player_ids.iter().enumerate() {
            if player_ids[..idx].contains(id) {
                return Err(ValidationError::DuplicatePlayer { id: *id });
            }
        }
        Ok(Self { player_ids, points })
    }

    /// Credited player ids, in selection order.
    pub fn player_ids(&self) -> &[PlayerId] {
        &self.player_ids
    }

    /// Points awarded to each listed player.
    pub fn points(&self) -> Points {
        self.points
    }
}

/// One recorded match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Stable match identifier.
    pub id: MatchId,
    /// Players credited by this match.
    pub player_ids: Vec<PlayerId>,
    /// Points awarded to each listed player (not split).
    pub points: Points,
    /// Creation time as display text. Never changed by edits.
    pub timestamp: String,
}

impl MatchRecord {
    /// Returns the credited part of the record as an entry.
    pub fn entry(&self) -> MatchEntry {
        MatchEntry {
            player_ids: self.player_ids.clone(),
            points: self.points,
        }
    }

    /// True when `id` receives credit from this match.
    pub fn credits(&self, id: PlayerId) -> bool {
        self.player_ids.contains(&id)
    }

    pub(crate) fn set_entry(&mut self, entry: MatchEntry) {
        self.player_ids = entry.player_ids;
        self.points = entry.points;
    }
}
