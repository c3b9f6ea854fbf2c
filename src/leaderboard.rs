//! Read-only ranking and history queries over the ledger.

use crate::{
    award::{AwardRecord, LeaderboardRow},
    ledger::{LedgerError, LedgerResult, PointsLedger},
    types::UserId,
};

/// Target of a history query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTarget {
    /// One member's full award history.
    User(UserId),
}

impl QueryTarget {
    /// Parses a stringly target kind as delivered by transports.
    ///
    /// Only `"user"` is supported; anything else fails fast with
    /// [`QueryError::InvalidScope`] and produces no partial result.
    pub fn parse(kind: &str, id: u64) -> Result<Self, QueryError> {
        match kind {
            "user" => Ok(Self::User(id)),
            other => Err(QueryError::InvalidScope(other.to_string())),
        }
    }
}

/// History/ranking query failure.
#[derive(Debug)]
pub enum QueryError {
    /// The query named an unsupported target kind.
    InvalidScope(String),
    /// The underlying ledger read failed.
    Ledger(LedgerError),
}

impl From<LedgerError> for QueryError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

/// Ranked totals across every user with at least one ledger row.
///
/// Rows are ordered by total descending; ties break by ascending user id so
/// the ordering is deterministic. Pagination and formatting belong to the
/// caller.
pub fn ranked_totals(ledger: &dyn PointsLedger) -> LedgerResult<Vec<LeaderboardRow>> {
    let mut rows: Vec<LeaderboardRow> = ledger
        .totals_by_user()?
        .into_iter()
        .map(|(user_id, total_points)| LeaderboardRow {
            user_id,
            total_points,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then(a.user_id.cmp(&b.user_id))
    });
    Ok(rows)
}

/// Award history for `target`, newest first.
pub fn history(
    ledger: &dyn PointsLedger,
    target: QueryTarget,
) -> Result<Vec<AwardRecord>, QueryError> {
    match target {
        QueryTarget::User(user_id) => Ok(ledger.by_user(user_id)?),
    }
}
