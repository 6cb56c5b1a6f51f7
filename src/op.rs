//! Mutation operation model.

use serde::{Deserialize, Serialize};

use crate::{
    match_record::{MatchEntry, MatchRecord},
    player::Player,
    types::{MatchId, OpSeq},
};

/// Record of one applied ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Players appended to the roster.
    PlayersAdded {
        /// New players, in roster order.
        players: Vec<Player>,
    },
    /// A player left the roster. History is untouched.
    PlayerRemoved {
        /// The removed player as it was at removal time.
        player: Player,
    },
    /// A match was recorded and credited.
    MatchRecorded {
        /// The new record.
        record: MatchRecord,
    },
    /// A match had its players or points replaced.
    MatchUpdated {
        /// Edited match id.
        id: MatchId,
        /// Credit before the edit.
        prev: MatchEntry,
        /// Credit after the edit.
        next: MatchEntry,
    },
    /// A match was removed and its credit reversed.
    MatchDeleted {
        /// The removed record.
        record: MatchRecord,
    },
    /// Roster and history were cleared.
    Reset {
        /// Players dropped.
        players: usize,
        /// Matches dropped.
        matches: usize,
    },
}

impl Op {
    /// Short status text suitable for a transient notification.
    pub fn notice(&self) -> String {
        match self {
            Op::PlayersAdded { players } => format!("{} player(s) added.", players.len()),
            Op::PlayerRemoved { player } => format!("Player \"{}\" removed.", player.name),
            Op::MatchRecorded { .. } => "Match result recorded!".to_string(),
            Op::MatchUpdated { .. } => "Match result updated!".to_string(),
            Op::MatchDeleted { .. } => "Match deleted.".to_string(),
            Op::Reset { .. } => "All data has been reset.".to_string(),
        }
    }
}

/// Operation plus sequencing metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOp {
    /// Monotonic operation sequence.
    pub seq: OpSeq,
    /// Operation timestamp in milliseconds.
    pub ts_ms: u64,
    /// Operation body.
    pub op: Op,
}
