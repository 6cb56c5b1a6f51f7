//! Runtime event stream payloads.

use crate::types::{MatchId, OpSeq, PlayerId};

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// Players were appended to the roster.
    PlayersAdded {
        /// New player ids.
        ids: Vec<PlayerId>,
    },
    /// A player left the roster.
    PlayerRemoved {
        /// Removed player id.
        id: PlayerId,
    },
    /// A match was recorded.
    MatchRecorded {
        /// New match id.
        id: MatchId,
    },
    /// A match was edited.
    MatchUpdated {
        /// Edited match id.
        id: MatchId,
    },
    /// A match was deleted.
    MatchDeleted {
        /// Deleted match id.
        id: MatchId,
    },
    /// Roster and history were cleared.
    Reset,
    /// Transient human-readable status text.
    Notice {
        /// Message to display.
        message: String,
    },
    /// Snapshots up to this op sequence have been saved.
    DurableUpTo {
        /// Highest sequence known durable.
        op_seq: OpSeq,
    },
    /// Saving the snapshot for this op sequence failed.
    ///
    /// In-memory state is unaffected; changes may not survive a restart.
    PersistenceFailed {
        /// Sequence whose snapshot was not saved.
        op_seq: OpSeq,
        /// Store error text.
        message: String,
    },
}
