use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    match_record::{MatchEntry, MatchRecord, ValidationError},
    op::{Op, StoredOp},
    player::Player,
    types::{MatchId, OpSeq, PlayerId, Points, now_ms},
};

use super::{leaderboard::Leaderboard, names::parse_names};

/// Reasons a ledger operation was refused. State is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No player with this id is on the roster.
    #[error("Player {0} not found.")]
    PlayerNotFound(PlayerId),
    /// No match with this id is in the history.
    #[error("Match {0} not found.")]
    MatchNotFound(MatchId),
    /// Applying the credit would push this player's total out of range.
    #[error("Points total for player {0} is out of range.")]
    PointsOverflow(PlayerId),
}

/// How editing a match treats games-played counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamesOnEdit {
    /// Move points only; games stay with whoever the match first credited.
    #[default]
    Preserve,
    /// Take a game back from the old players and give one to the new players.
    Rebalance,
}

/// Behaviour switches for [`Ledger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Games-played handling for [`Ledger::update_match`].
    pub games_on_edit: GamesOnEdit,
}

/// The persisted unit: full roster plus newest-first match history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Roster in insertion order.
    #[serde(default)]
    pub players: Vec<Player>,
    /// Matches, newest first.
    #[serde(default)]
    pub match_history: Vec<MatchRecord>,
}

/// Authoritative roster and match history.
///
/// Every mutation either applies completely and returns the [`StoredOp`]
/// describing it, or returns an error and leaves the ledger untouched.
#[derive(Debug, Default)]
pub struct Ledger {
    players: Vec<Player>,
    pos: HashMap<PlayerId, usize>,
    matches: Vec<MatchRecord>,
    config: LedgerConfig,
    next_player_id: PlayerId,
    next_match_id: MatchId,
    next_op_seq: OpSeq,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            next_player_id: 1,
            next_match_id: 1,
            next_op_seq: 1,
            ..Self::default()
        }
    }

    /// Rebuilds a ledger from a snapshot without altering it.
    ///
    /// Id counters resume above every id present, including ids that only
    /// survive as orphaned references in the history.
    pub fn from_snapshot(snapshot: Snapshot, config: LedgerConfig) -> Self {
        let mut ledger = Self::new(config);

        let max_player = snapshot
            .players
            .iter()
            .map(|p| p.id)
            .chain(snapshot.match_history.iter().flat_map(|m| m.player_ids.iter().copied()))
            .max()
            .unwrap_or(0);
        let max_match = snapshot.match_history.iter().map(|m| m.id).max().unwrap_or(0);

        ledger.next_player_id = max_player.saturating_add(1);
        ledger.next_match_id = max_match.saturating_add(1);
        ledger.players = snapshot.players;
        ledger.matches = snapshot.match_history;
        ledger.rebuild_index();
        ledger
    }

    /// Copies the current state out for persistence.
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            players: self.players.clone(),
            match_history: self.matches.clone(),
        }
    }

    /// Parses `raw` into names and appends a zeroed player per name.
    ///
    /// Returns `None` and changes nothing when no names are found.
    pub fn add_players(&mut self, raw: &str) -> Option<(Vec<PlayerId>, StoredOp)> {
        let names = parse_names(raw);
        if names.is_empty() {
            return None;
        }

        let mut added = Vec::with_capacity(names.len());
        for name in names {
            let id = self.next_player_id;
            self.next_player_id += 1;
            let player = Player::new(id, name);
            self.pos.insert(id, self.players.len());
            self.players.push(player.clone());
            added.push(player);
        }

        let ids = added.iter().map(|p| p.id).collect();
        let stored = self.stamp(Op::PlayersAdded { players: added });
        Some((ids, stored))
    }

    /// Removes a player from the roster. Matches naming them are kept.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<(Player, StoredOp), LedgerError> {
        let idx = *self.pos.get(&id).ok_or(LedgerError::PlayerNotFound(id))?;
        let player = self.players.remove(idx);
        self.rebuild_index();

        let stored = self.stamp(Op::PlayerRemoved {
            player: player.clone(),
        });
        Ok((player, stored))
    }

    /// Records a match and credits each listed player still on the roster.
    pub fn record_match(&mut self, player_ids: Vec<PlayerId>, points: Points) -> Result<(MatchId, StoredOp), LedgerError> {
        let entry = MatchEntry::new(player_ids, points)?;
        self.credit(&[(entry.player_ids(), entry.points(), 1)])?;

        let id = self.next_match_id;
        self.next_match_id += 1;
        let record = MatchRecord {
            id,
            player_ids: entry.player_ids().to_vec(),
            points: entry.points(),
            timestamp: display_now(),
        };
        self.matches.insert(0, record.clone());

        let stored = self.stamp(Op::MatchRecorded { record });
        Ok((id, stored))
    }

    /// Replaces a match's players and points, moving the credit accordingly.
    ///
    /// Returns the credit the match carried before the edit. `id` and
    /// `timestamp` are kept. Games-played handling follows
    /// [`LedgerConfig::games_on_edit`].
    pub fn update_match(
        &mut self,
        id: MatchId,
        player_ids: Vec<PlayerId>,
        points: Points,
    ) -> Result<(MatchEntry, StoredOp), LedgerError> {
        let next = MatchEntry::new(player_ids, points)?;
        let idx = self.match_index(id).ok_or(LedgerError::MatchNotFound(id))?;
        let prev = self.matches[idx].entry();

        let games = match self.config.games_on_edit {
            GamesOnEdit::Preserve => 0,
            GamesOnEdit::Rebalance => 1,
        };
        self.credit(&[
            (prev.player_ids(), -prev.points(), -games),
            (next.player_ids(), next.points(), games),
        ])?;
        self.matches[idx].set_entry(next.clone());

        let stored = self.stamp(Op::MatchUpdated {
            id,
            prev: prev.clone(),
            next,
        });
        Ok((prev, stored))
    }

    /// Removes a match and reverses its credit for players still listed.
    pub fn delete_match(&mut self, id: MatchId) -> Result<(MatchRecord, StoredOp), LedgerError> {
        let idx = self.match_index(id).ok_or(LedgerError::MatchNotFound(id))?;
        let entry = self.matches[idx].entry();
        self.credit(&[(entry.player_ids(), -entry.points(), -1)])?;
        let record = self.matches.remove(idx);

        let stored = self.stamp(Op::MatchDeleted {
            record: record.clone(),
        });
        Ok((record, stored))
    }

    /// Clears roster and history. Confirmation is the caller's job.
    pub fn reset_all(&mut self) -> StoredOp {
        let players = self.players.len();
        let matches = self.matches.len();
        self.players.clear();
        self.matches.clear();
        self.pos.clear();
        self.stamp(Op::Reset { players, matches })
    }

    /// Roster ranked by points.
    pub fn leaderboard(&self) -> Leaderboard<'_> {
        Leaderboard::new(&self.players)
    }

    /// Roster in insertion order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Match history, newest first.
    pub fn match_history(&self) -> &[MatchRecord] {
        &self.matches
    }

    /// Looks up a player on the roster.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.pos.get(&id).map(|idx| &self.players[*idx])
    }

    /// Looks up a match in the history.
    pub fn match_record(&self, id: MatchId) -> Option<&MatchRecord> {
        self.match_index(id).map(|idx| &self.matches[idx])
    }

    /// Active configuration.
    pub fn config(&self) -> LedgerConfig {
        self.config
    }

    /// Recomputes `(points, games)` from history for each rostered player.
    ///
    /// Players with no matches map to `(0, 0)`. Orphaned references are
    /// ignored.
    pub fn tally_history(&self) -> HashMap<PlayerId, (Points, u32)> {
        let mut tally: HashMap<PlayerId, (Points, u32)> =
            self.players.iter().map(|p| (p.id, (0, 0))).collect();
        for record in &self.matches {
            for id in &record.player_ids {
                if let Some((points, games)) = tally.get_mut(id) {
                    *points = points.saturating_add(record.points);
                    *games += 1;
                }
            }
        }
        tally
    }

    /// Sequence number of the most recent mutation, or 0.
    pub fn latest_op_seq(&self) -> OpSeq {
        self.next_op_seq.saturating_sub(1)
    }

    /// Applies `(ids, points, games)` credits all-or-nothing.
    ///
    /// New totals are staged with checked arithmetic first; nothing is
    /// written if any player's total would overflow.
    fn credit(&mut self, changes: &[(&[PlayerId], Points, i32)]) -> Result<(), LedgerError> {
        let mut staged: Vec<(usize, Points, i32)> = Vec::new();
        for (ids, points, games) in changes {
            for id in *ids {
                // players no longer on the roster are skipped
                let Some(&idx) = self.pos.get(id) else {
                    continue;
                };
                let slot = match staged.iter().position(|s| s.0 == idx) {
                    Some(slot) => slot,
                    None => {
                        staged.push((idx, self.players[idx].points, 0));
                        staged.len() - 1
                    }
                };
                let entry = &mut staged[slot];
                entry.1 = entry.1.checked_add(*points).ok_or(LedgerError::PointsOverflow(*id))?;
                entry.2 += games;
            }
        }

        for (idx, points, games) in staged {
            self.players[idx].set_totals(points, games);
        }
        Ok(())
    }

    fn match_index(&self, id: MatchId) -> Option<usize> {
        self.matches.iter().position(|m| m.id == id)
    }

    fn rebuild_index(&mut self) {
        self.pos.clear();
        for (idx, player) in self.players.iter().enumerate() {
            self.pos.insert(player.id, idx);
        }
    }

    fn stamp(&mut self, op: Op) -> StoredOp {
        let seq = self.next_op_seq;
        self.next_op_seq += 1;
        debug!(seq, notice = %op.notice(), "ledger op applied");
        StoredOp {
            seq,
            ts_ms: now_ms(),
            op,
        }
    }
}

fn display_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
