//! Americano-style pickleball scorekeeping ledger with snapshot persistence.
//!
//! # Examples
//!
//! In-memory usage with [`core::ledger::Ledger`]:
//! ```
//! use pickleball_ledger::core::ledger::{Ledger, LedgerConfig};
//!
//! let mut ledger = Ledger::new(LedgerConfig::default());
//! let (ids, _op) = ledger.add_players("Alice, Bob").expect("names");
//! let (_match_id, op) = ledger.record_match(vec![ids[0]], 11).expect("record");
//! assert_eq!(op.op.notice(), "Match result recorded!");
//! assert_eq!(ledger.player(ids[0]).map(|p| p.points), Some(11));
//! assert_eq!(ledger.leaderboard().iter().next().map(|p| p.id), Some(ids[0]));
//! ```
//!
//! Runtime usage with SQLite store:
//! ```no_run
//! use pickleball_ledger::{
//!     persist::sqlite::SqliteSnapshotStore,
//!     runtime::handle::{open_ledger, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = SqliteSnapshotStore::open("pickleball.db").expect("open sqlite");
//! let (handle, _seeded) = open_ledger(Box::new(store), RuntimeConfig::default())
//!     .await
//!     .expect("open ledger");
//! let ids = handle.add_players("Fiona\nGus").await.expect("add");
//! handle.record_match(ids, 7).await.expect("record");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![warn(missing_docs)]

/// In-memory ledger, leaderboard, and roster parsing.
pub mod core;
/// Match records and input validation.
pub mod match_record;
/// Mutation op model.
pub mod op;
/// Snapshot store abstraction with SQLite and in-memory implementations.
pub mod persist;
/// Roster entries.
pub mod player;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared primitive types.
pub mod types;
