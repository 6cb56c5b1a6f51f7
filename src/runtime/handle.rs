use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot};
use tracing::{debug, warn};

use crate::{
    core::ledger::{Ledger, LedgerConfig, LedgerError, Snapshot},
    op::StoredOp,
    persist::{PersistError, SnapshotStore, initialize},
    player::Player,
    types::{MatchId, OpSeq, PlayerId, Points, STORE_KEY},
};

use super::events::LedgerEvent;

/// Failure returned through [`LedgerHandle`].
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The ledger refused the operation; nothing changed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// The snapshot store failed to load or save.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// The runtime task has stopped.
    #[error("ledger runtime is not running")]
    ChannelClosed,
}

/// Runtime tuning and storage settings.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Key every snapshot is saved under.
    pub store_key: String,
    /// Snapshots allowed to wait for the store before mutations block.
    pub persist_queue_bound: usize,
    /// Broadcast buffer for [`LedgerEvent`]s.
    pub event_capacity: usize,
    /// Ledger behaviour used by [`open_ledger`].
    pub ledger: LedgerConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            store_key: STORE_KEY.to_string(),
            persist_queue_bound: 64,
            event_capacity: 1024,
            ledger: LedgerConfig::default(),
        }
    }
}

/// Cloneable front end to the single-writer ledger task.
#[derive(Clone)]
pub struct LedgerHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<LedgerEvent>,
}

enum Command {
    AddPlayers {
        raw: String,
        resp: oneshot::Sender<Vec<PlayerId>>,
    },
    RemovePlayer {
        id: PlayerId,
        resp: oneshot::Sender<Result<Player, RuntimeError>>,
    },
    RecordMatch {
        player_ids: Vec<PlayerId>,
        points: Points,
        resp: oneshot::Sender<Result<MatchId, RuntimeError>>,
    },
    UpdateMatch {
        id: MatchId,
        player_ids: Vec<PlayerId>,
        points: Points,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    DeleteMatch {
        id: MatchId,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    ResetAll {
        resp: oneshot::Sender<()>,
    },
    Snapshot {
        resp: oneshot::Sender<Snapshot>,
    },
    Leaderboard {
        resp: oneshot::Sender<Vec<Player>>,
    },
    Flush {
        resp: oneshot::Sender<Result<OpSeq, RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

enum PersistMsg {
    Save {
        seq: OpSeq,
        snapshot: Snapshot,
    },
    Flush {
        resp: oneshot::Sender<Result<OpSeq, PersistError>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

enum Durability {
    Saved(OpSeq),
    Failed { op_seq: OpSeq, message: String },
}

/// Loads (or seeds) the ledger from `store` and starts the runtime on it.
///
/// The flag is true when the demo roster was seeded. If the seeded roster
/// could not be saved the runtime still starts, and the next
/// [`LedgerHandle::flush`] reports that failure.
pub async fn open_ledger(
    store: Box<dyn SnapshotStore>,
    config: RuntimeConfig,
) -> Result<(LedgerHandle, bool), RuntimeError> {
    let key = config.store_key.clone();
    let ledger_config = config.ledger;
    let (store, loaded) = tokio::task::spawn_blocking(move || {
        let mut store = store;
        let loaded = initialize(store.as_mut(), &key, ledger_config);
        (store, loaded)
    })
    .await
    .map_err(|e| PersistError::Message(format!("join error: {e}")))?;

    let init = loaded?;
    let pending_failure = init
        .seed_error
        .map(|err| (0, format!("seeding failed: {err}")));
    let handle = start(init.ledger, Some(store), config, pending_failure);
    Ok((handle, init.seeded))
}

/// Starts the single-writer task that owns `ledger`.
///
/// With a store, every applied mutation queues a full snapshot; snapshots are
/// written one at a time in mutation order.
pub fn spawn_ledger(
    ledger: Ledger,
    store: Option<Box<dyn SnapshotStore>>,
    config: RuntimeConfig,
) -> LedgerHandle {
    start(ledger, store, config, None)
}

fn start(
    ledger: Ledger,
    store: Option<Box<dyn SnapshotStore>>,
    config: RuntimeConfig,
    pending_failure: Option<(OpSeq, String)>,
) -> LedgerHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(256);
    let (events_tx, _) = broadcast::channel::<LedgerEvent>(config.event_capacity.max(1));

    let (persist_tx_opt, mut durable_rx) = if let Some(store) = store {
        let (persist_tx, persist_rx) = mpsc::channel::<PersistMsg>(config.persist_queue_bound.max(1));
        let (durable_tx, durable_rx) = mpsc::unbounded_channel::<Durability>();
        spawn_persistence_worker(store, config.store_key.clone(), persist_rx, durable_tx, pending_failure);
        (Some(persist_tx), Some(durable_rx))
    } else {
        (None, None)
    };

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut ledger = ledger;

        loop {
            if let Some(rx) = durable_rx.as_mut() {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else { break; };
                        if handle_command(cmd, &mut ledger, &events_tx_loop, persist_tx_opt.as_ref()).await {
                            break;
                        }
                    }
                    durable = rx.recv() => {
                        if let Some(durable) = durable {
                            report_durability(durable, &events_tx_loop);
                        }
                    }
                }
            } else {
                let Some(cmd) = cmd_rx.recv().await else { break; };
                if handle_command(cmd, &mut ledger, &events_tx_loop, persist_tx_opt.as_ref()).await {
                    break;
                }
            }
        }

        // surface outcomes of saves that finished during shutdown
        if let Some(rx) = durable_rx.as_mut() {
            while let Ok(durable) = rx.try_recv() {
                report_durability(durable, &events_tx_loop);
            }
        }
    });

    LedgerHandle { cmd_tx, events_tx }
}

impl LedgerHandle {
    /// Subscribes to ledger events, notices, and durability reports.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events_tx.subscribe()
    }

    /// Adds one player per parsed name; returns their ids (empty on no-op).
    pub async fn add_players(&self, raw: impl Into<String>) -> Result<Vec<PlayerId>, RuntimeError> {
        let raw = raw.into();
        self.request(|resp| Command::AddPlayers { raw, resp }).await
    }

    /// Removes a player; their past matches stay in the history.
    pub async fn remove_player(&self, id: PlayerId) -> Result<Player, RuntimeError> {
        self.request(|resp| Command::RemovePlayer { id, resp }).await?
    }

    /// Records a match and returns its id.
    pub async fn record_match(&self, player_ids: Vec<PlayerId>, points: Points) -> Result<MatchId, RuntimeError> {
        self.request(|resp| Command::RecordMatch {
            player_ids,
            points,
            resp,
        })
        .await?
    }

    /// Replaces a match's players and points.
    pub async fn update_match(&self, id: MatchId, player_ids: Vec<PlayerId>, points: Points) -> Result<(), RuntimeError> {
        self.request(|resp| Command::UpdateMatch {
            id,
            player_ids,
            points,
            resp,
        })
        .await?
    }

    /// Deletes a match and reverses its credit.
    pub async fn delete_match(&self, id: MatchId) -> Result<(), RuntimeError> {
        self.request(|resp| Command::DeleteMatch { id, resp }).await?
    }

    /// Clears everything. Callers confirm with the user first.
    pub async fn reset_all(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::ResetAll { resp }).await
    }

    /// Copy of the current roster and history.
    pub async fn snapshot(&self) -> Result<Snapshot, RuntimeError> {
        self.request(|resp| Command::Snapshot { resp }).await
    }

    /// Roster ranked by points, highest first.
    pub async fn leaderboard(&self) -> Result<Vec<Player>, RuntimeError> {
        self.request(|resp| Command::Leaderboard { resp }).await
    }

    /// Waits until every queued snapshot has been handled.
    ///
    /// Returns the highest durable op sequence, or the error of a save that
    /// failed since the previous flush.
    pub async fn flush(&self) -> Result<OpSeq, RuntimeError> {
        self.request(|resp| Command::Flush { resp }).await?
    }

    /// Drains queued snapshots and stops the runtime.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Shutdown { resp }).await?
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

async fn handle_command(
    cmd: Command,
    ledger: &mut Ledger,
    events_tx: &broadcast::Sender<LedgerEvent>,
    persist_tx: Option<&mpsc::Sender<PersistMsg>>,
) -> bool {
    match cmd {
        Command::AddPlayers { raw, resp } => {
            let ids = match ledger.add_players(&raw) {
                Some((ids, stored)) => {
                    let event = LedgerEvent::PlayersAdded { ids: ids.clone() };
                    committed(ledger, stored, event, events_tx, persist_tx).await;
                    ids
                }
                None => Vec::new(),
            };
            let _ = resp.send(ids);
        }
        Command::RemovePlayer { id, resp } => {
            let res = match ledger.remove_player(id) {
                Ok((player, stored)) => {
                    committed(ledger, stored, LedgerEvent::PlayerRemoved { id }, events_tx, persist_tx).await;
                    Ok(player)
                }
                Err(err) => Err(RuntimeError::from(err)),
            };
            let _ = resp.send(res);
        }
        Command::RecordMatch {
            player_ids,
            points,
            resp,
        } => {
            let res = match ledger.record_match(player_ids, points) {
                Ok((id, stored)) => {
                    committed(ledger, stored, LedgerEvent::MatchRecorded { id }, events_tx, persist_tx).await;
                    Ok(id)
                }
                Err(err) => Err(RuntimeError::from(err)),
            };
            let _ = resp.send(res);
        }
        Command::UpdateMatch {
            id,
            player_ids,
            points,
            resp,
        } => {
            let res = match ledger.update_match(id, player_ids, points) {
                Ok((_, stored)) => {
                    committed(ledger, stored, LedgerEvent::MatchUpdated { id }, events_tx, persist_tx).await;
                    Ok(())
                }
                Err(err) => Err(RuntimeError::from(err)),
            };
            let _ = resp.send(res);
        }
        Command::DeleteMatch { id, resp } => {
            let res = match ledger.delete_match(id) {
                Ok((_, stored)) => {
                    committed(ledger, stored, LedgerEvent::MatchDeleted { id }, events_tx, persist_tx).await;
                    Ok(())
                }
                Err(err) => Err(RuntimeError::from(err)),
            };
            let _ = resp.send(res);
        }
        Command::ResetAll { resp } => {
            let stored = ledger.reset_all();
            committed(ledger, stored, LedgerEvent::Reset, events_tx, persist_tx).await;
            let _ = resp.send(());
        }
        Command::Snapshot { resp } => {
            let _ = resp.send(ledger.export_snapshot());
        }
        Command::Leaderboard { resp } => {
            let _ = resp.send(ledger.leaderboard().to_vec());
        }
        Command::Flush { resp } => {
            let out = if let Some(tx) = persist_tx {
                let (flush_tx, flush_rx) = oneshot::channel();
                if tx.send(PersistMsg::Flush { resp: flush_tx }).await.is_err() {
                    Err(RuntimeError::ChannelClosed)
                } else {
                    flush_rx
                        .await
                        .map_err(|_| RuntimeError::ChannelClosed)
                        .and_then(|r| r.map_err(RuntimeError::from))
                }
            } else {
                Ok(ledger.latest_op_seq())
            };
            let _ = resp.send(out);
        }
        Command::Shutdown { resp } => {
            debug!(last_op_seq = ledger.latest_op_seq(), "ledger runtime shutting down");
            let out = if let Some(tx) = persist_tx {
                let (done_tx, done_rx) = oneshot::channel();
                if tx.send(PersistMsg::Shutdown { resp: done_tx }).await.is_err() {
                    Err(RuntimeError::ChannelClosed)
                } else {
                    done_rx.await.map_err(|_| RuntimeError::ChannelClosed)
                }
            } else {
                Ok(())
            };
            let _ = resp.send(out);
            return true;
        }
    }

    false
}

/// Queues the post-mutation snapshot and announces the change.
async fn committed(
    ledger: &Ledger,
    stored: StoredOp,
    event: LedgerEvent,
    events_tx: &broadcast::Sender<LedgerEvent>,
    persist_tx: Option<&mpsc::Sender<PersistMsg>>,
) {
    if let Some(tx) = persist_tx {
        let msg = PersistMsg::Save {
            seq: stored.seq,
            snapshot: ledger.export_snapshot(),
        };
        // waits for queue room rather than dropping an intermediate state
        if tx.send(msg).await.is_err() {
            report_durability(
                Durability::Failed {
                    op_seq: stored.seq,
                    message: "persistence worker stopped".to_string(),
                },
                events_tx,
            );
        }
    }

    let _ = events_tx.send(event);
    let _ = events_tx.send(LedgerEvent::Notice {
        message: stored.op.notice(),
    });
}

fn report_durability(durable: Durability, events_tx: &broadcast::Sender<LedgerEvent>) {
    match durable {
        Durability::Saved(op_seq) => {
            let _ = events_tx.send(LedgerEvent::DurableUpTo { op_seq });
        }
        Durability::Failed { op_seq, message } => {
            warn!(op_seq, error = %message, "snapshot save failed; changes may not survive a restart");
            let _ = events_tx.send(LedgerEvent::PersistenceFailed {
                op_seq,
                message: message.clone(),
            });
            let _ = events_tx.send(LedgerEvent::Notice {
                message: format!("Changes could not be saved and may be lost on restart: {message}"),
            });
        }
    }
}

fn spawn_persistence_worker(
    store: Box<dyn SnapshotStore>,
    key: String,
    mut rx: mpsc::Receiver<PersistMsg>,
    durable_tx: mpsc::UnboundedSender<Durability>,
    pending_failure: Option<(OpSeq, String)>,
) {
    let store = Arc::new(Mutex::new(store));
    tokio::spawn(async move {
        let mut last_durable: OpSeq = 0;
        let mut failed_since_flush = pending_failure;

        while let Some(msg) = rx.recv().await {
            match msg {
                PersistMsg::Save { seq, snapshot } => {
                    let store_ref = Arc::clone(&store);
                    let key = key.clone();
                    let res = tokio::task::spawn_blocking(move || {
                        let mut store = store_ref.blocking_lock();
                        store.save(&key, &snapshot)
                    })
                    .await
                    .map_err(|e| PersistError::Message(format!("join error: {e}")))
                    .and_then(|inner| inner);

                    match res {
                        Ok(()) => {
                            last_durable = last_durable.max(seq);
                            let _ = durable_tx.send(Durability::Saved(last_durable));
                        }
                        Err(err) => {
                            let message = err.to_string();
                            failed_since_flush = Some((seq, message.clone()));
                            let _ = durable_tx.send(Durability::Failed { op_seq: seq, message });
                        }
                    }
                }
                PersistMsg::Flush { resp } => {
                    let out = match failed_since_flush.take() {
                        Some((seq, message)) => Err(PersistError::Message(format!(
                            "save for op {seq} failed: {message}"
                        ))),
                        None => Ok(last_durable),
                    };
                    let _ = resp.send(out);
                }
                PersistMsg::Shutdown { resp } => {
                    let _ = resp.send(());
                    break;
                }
            }
        }
    });
}
