//! Activity-points accrual with an append-only SQLite ledger.
//!
//! Chat events feed a per-user cooldown/batching state machine whose epoch
//! flushes write immutable award rows; voice-state changes drive presence
//! sessions that award on close; rankings and histories are recomputed from
//! the ledger on demand.
//!
//! # Examples
//!
//! Synchronous accrual with [`accrual::AccrualEngine`]:
//! ```
//! use pointlog::accrual::{AccrualConfig, AccrualEngine, ChatActivity, RecordOutcome};
//!
//! let mut engine = AccrualEngine::new(AccrualConfig::default());
//! let outcome = engine.record_activity(&ChatActivity {
//!     user_id: 7,
//!     content_len: 40,
//!     ts_ms: 1_000_000,
//! });
//! assert!(matches!(outcome, RecordOutcome::Credited { reward: 25, .. }));
//! ```
//!
//! Runtime usage with the SQLite ledger:
//! ```no_run
//! use pointlog::{
//!     accrual::ChatActivity,
//!     ledger::sqlite::SqliteLedger,
//!     runtime::handle::{spawn_pointlog, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let ledger = SqliteLedger::open("points.db").expect("open sqlite");
//! let handle = spawn_pointlog(Box::new(ledger), RuntimeConfig::default());
//! handle
//!     .chat_activity(ChatActivity { user_id: 7, content_len: 40, ts_ms: 1_000_000 })
//!     .await
//!     .expect("chat activity");
//! let rows = handle.ranked_totals().await.expect("totals");
//! assert!(rows.is_empty() || rows[0].total_points > 0);
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Chat-activity accrual engine: cooldown, reward schedule, epoch flush.
pub mod accrual;
/// Award records, drafts, and leaderboard rows.
pub mod award;
/// Ranked totals and history queries.
pub mod leaderboard;
/// Ledger contract and SQLite implementation.
pub mod ledger;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared primitive types and the reason enum.
pub mod types;
/// Voice-presence sessions and interval awards.
pub mod voice;
