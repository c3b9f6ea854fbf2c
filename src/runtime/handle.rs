use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::{
    sync::{Mutex, broadcast, mpsc, oneshot},
    time::Duration,
};
use tracing::{debug, warn};

use crate::{
    accrual::{AccrualConfig, AccrualEngine, ChatActivity, RecordOutcome},
    award::{AwardDraft, AwardRecord, LeaderboardRow},
    leaderboard::{self, QueryError, QueryTarget},
    ledger::{LedgerError, PointsLedger},
    types::{TsMs, UserId},
    voice::{VoiceConfig, VoiceStateChange, VoiceTracker},
};

use super::events::PointsEvent;

/// Runtime failure surfaced through [`PointsHandle`] calls.
#[derive(Debug)]
pub enum RuntimeError {
    /// Ledger append or read failed. Appends are not retried here.
    Ledger(LedgerError),
    /// A history query failed.
    Query(QueryError),
    /// The runtime loop has stopped.
    ChannelClosed,
}

impl From<LedgerError> for RuntimeError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<QueryError> for RuntimeError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

/// Runtime tunables.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Accrual-engine tunables, including the epoch flush delay.
    pub accrual: AccrualConfig,
    /// Voice-tracker tunables.
    pub voice: VoiceConfig,
    /// Command channel capacity.
    pub command_capacity: usize,
    /// Broadcast event channel capacity.
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            accrual: AccrualConfig::default(),
            voice: VoiceConfig::default(),
            command_capacity: 256,
            event_capacity: 1024,
        }
    }
}

/// Cloneable handle to the single-writer points runtime.
pub struct PointsHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<PointsEvent>,
}

impl Clone for PointsHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    ChatActivity {
        event: ChatActivity,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    VoiceStateChange {
        event: VoiceStateChange,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    // Sent by the deferred epoch timer, never by handle callers.
    FlushUser {
        user_id: UserId,
    },
    RankedTotals {
        resp: oneshot::Sender<Result<Vec<LeaderboardRow>, RuntimeError>>,
    },
    History {
        target: QueryTarget,
        resp: oneshot::Sender<Result<Vec<AwardRecord>, RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

/// Spawns the points runtime over `ledger` and returns its handle.
///
/// All accrual state, voice sessions, and ledger appends are driven from one
/// task, so `record_activity` and `flush` for the same user never interleave.
pub fn spawn_pointlog(ledger: Box<dyn PointsLedger>, config: RuntimeConfig) -> PointsHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_capacity);
    let (events_tx, _) = broadcast::channel::<PointsEvent>(config.event_capacity);

    let ledger = Arc::new(Mutex::new(ledger));
    let events_tx_loop = events_tx.clone();
    let timer_tx = cmd_tx.clone();

    tokio::spawn(async move {
        let mut engine = AccrualEngine::new(config.accrual.clone());
        let mut tracker = VoiceTracker::new(config.voice.clone());

        while let Some(cmd) = cmd_rx.recv().await {
            let done = handle_command(
                cmd,
                &mut engine,
                &mut tracker,
                &ledger,
                &events_tx_loop,
                &timer_tx,
            )
            .await;
            if done {
                break;
            }
        }
    });

    PointsHandle { cmd_tx, events_tx }
}

impl PointsHandle {
    /// Subscribes to the runtime event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<PointsEvent> {
        self.events_tx.subscribe()
    }

    /// Feeds one chat-activity event through the accrual engine.
    pub async fn chat_activity(&self, event: ChatActivity) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::ChatActivity { event, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Feeds one voice-state change through the presence tracker.
    ///
    /// Any session-end award is appended before this returns; append errors
    /// surface here.
    pub async fn voice_state_change(&self, event: VoiceStateChange) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::VoiceStateChange { event, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Ranked totals over the whole ledger, highest first.
    pub async fn ranked_totals(&self) -> Result<Vec<LeaderboardRow>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::RankedTotals { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Award history for `target`, newest first.
    pub async fn history(&self, target: QueryTarget) -> Result<Vec<AwardRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::History { target, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Stops the runtime loop. Pending epoch timers are abandoned; unflushed
    /// accrual state is lost, as documented.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }
}

async fn handle_command(
    cmd: Command,
    engine: &mut AccrualEngine,
    tracker: &mut VoiceTracker,
    ledger: &Arc<Mutex<Box<dyn PointsLedger>>>,
    events_tx: &broadcast::Sender<PointsEvent>,
    timer_tx: &mpsc::Sender<Command>,
) -> bool {
    match cmd {
        Command::ChatActivity { event, resp } => {
            let user_id = event.user_id;
            if let RecordOutcome::Credited {
                reward,
                accumulated,
                schedule_flush,
            } = engine.record_activity(&event)
            {
                debug!(user_id, reward, accumulated, "chat credit");
                let _ = events_tx.send(PointsEvent::Credited {
                    user_id,
                    reward,
                    accumulated,
                });
                if schedule_flush {
                    spawn_flush_timer(timer_tx.clone(), user_id, engine.config().epoch_ms);
                    let _ = events_tx.send(PointsEvent::FlushScheduled { user_id });
                }
            }
            let _ = resp.send(Ok(()));
        }
        Command::VoiceStateChange { event, resp } => {
            let user_id = event.user_id;
            let had_session = tracker.session(user_id).is_some();
            let award = tracker.on_state_change(&event);
            let ts_ms = event.ts_ms;

            if had_session {
                let _ = events_tx.send(PointsEvent::SessionEnded { user_id });
            }
            if tracker.session(user_id).is_some() {
                debug!(user_id, "voice session started");
                let _ = events_tx.send(PointsEvent::SessionStarted { user_id });
            }

            let res = match award {
                Some(draft) => append_award(ledger, events_tx, draft, ts_ms).await,
                None => Ok(()),
            };
            let _ = resp.send(res);
        }
        Command::FlushUser { user_id } => {
            match engine.flush(user_id) {
                Some(draft) => {
                    debug!(user_id, points = draft.points, "epoch flush");
                    if let Err(err) = append_award(ledger, events_tx, draft, now_ms()).await {
                        warn!(user_id, ?err, "epoch flush append failed");
                    }
                }
                None => debug!(user_id, "epoch flush with nothing accrued"),
            }
        }
        Command::RankedTotals { resp } => {
            let ledger_ref = Arc::clone(ledger);
            let out = tokio::task::spawn_blocking(move || {
                let ledger = ledger_ref.blocking_lock();
                leaderboard::ranked_totals(ledger.as_ref())
            })
            .await
            .map_err(|e| RuntimeError::Ledger(LedgerError::Message(format!("join error: {e}"))))
            .and_then(|r| r.map_err(RuntimeError::from));
            let _ = resp.send(out);
        }
        Command::History { target, resp } => {
            let ledger_ref = Arc::clone(ledger);
            let out = tokio::task::spawn_blocking(move || {
                let ledger = ledger_ref.blocking_lock();
                leaderboard::history(ledger.as_ref(), target)
            })
            .await
            .map_err(|e| RuntimeError::Ledger(LedgerError::Message(format!("join error: {e}"))))
            .and_then(|r| r.map_err(RuntimeError::from));
            let _ = resp.send(out);
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(Ok(()));
            return true;
        }
    }

    false
}

// One-shot timer: sleeps out the epoch, then hands the flush back to the
// loop so it executes mutually exclusive with activity for the same user.
// There is no cancellation; the flag in the engine keeps it to one live
// timer per user.
fn spawn_flush_timer(timer_tx: mpsc::Sender<Command>, user_id: UserId, epoch_ms: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(epoch_ms)).await;
        let _ = timer_tx.send(Command::FlushUser { user_id }).await;
    });
}

async fn append_award(
    ledger: &Arc<Mutex<Box<dyn PointsLedger>>>,
    events_tx: &broadcast::Sender<PointsEvent>,
    draft: AwardDraft,
    ts_ms: TsMs,
) -> Result<(), RuntimeError> {
    let record = draft.into_record(ts_ms);
    let ledger_ref = Arc::clone(ledger);
    let announce = record.clone();

    let written = tokio::task::spawn_blocking(move || {
        let mut ledger = ledger_ref.blocking_lock();
        ledger.append(&record)
    })
    .await
    .map_err(|e| RuntimeError::Ledger(LedgerError::Message(format!("join error: {e}"))))?
    .map_err(RuntimeError::from)?;

    if written {
        let _ = events_tx.send(PointsEvent::Awarded {
            user_id: announce.user_id,
            points: announce.points,
            reason: announce.reason,
        });
    }
    Ok(())
}

fn now_ms() -> TsMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
