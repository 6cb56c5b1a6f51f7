//! In-memory ledger and its read helpers.

/// Points-ranked view of the roster.
pub mod leaderboard;
/// Authoritative player/match ledger.
pub mod ledger;
/// Roster text parsing.
pub mod names;
/// First-run demo roster.
pub mod seed;
