//! Append-only points ledger contract.

/// SQLite implementation of the ledger.
pub mod sqlite;

use crate::{award::AwardRecord, types::UserId};

/// Ledger failure.
#[derive(Debug)]
pub enum LedgerError {
    /// Underlying SQLite error.
    Sqlite(rusqlite::Error),
    /// Anything else, including corrupt persisted rows.
    Message(String),
}

impl From<rusqlite::Error> for LedgerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Ledger operation result.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Append/query contract over the persisted award ledger.
///
/// Rows are immutable once written; implementations never update or delete.
/// Appends carry no retry policy here; failures propagate to the caller.
pub trait PointsLedger: Send {
    /// Persists one award. Returns `Ok(false)` without writing when
    /// `record.points` is zero; zero awards are dropped, not faults.
    fn append(&mut self, record: &AwardRecord) -> LedgerResult<bool>;

    /// All rows for `user_id`, newest first.
    fn by_user(&self, user_id: UserId) -> LedgerResult<Vec<AwardRecord>>;

    /// Total points per user, covering every user with at least one row.
    fn totals_by_user(&self) -> LedgerResult<Vec<(UserId, u64)>>;
}
