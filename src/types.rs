//! Shared primitive IDs and constants.

use std::time::{SystemTime, UNIX_EPOCH};

/// Monotonic player identifier.
pub type PlayerId = u64;
/// Monotonic match identifier.
pub type MatchId = u64;
/// Monotonic operation sequence number.
pub type OpSeq = u64;
/// Point value carried by players and matches.
pub type Points = i64;

/// Key under which the full ledger snapshot is stored.
pub const STORE_KEY: &str = "appData";

/// Wall-clock milliseconds since the Unix epoch, or 0 if the clock is unset.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
