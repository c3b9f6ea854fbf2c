//! Award records, drafts, and derived leaderboard rows.

use serde::{Deserialize, Serialize};

use crate::types::{AwardReason, Points, TsMs, UserId};

/// Immutable point award as persisted in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardRecord {
    /// Member the points were awarded to.
    pub user_id: UserId,
    /// Points awarded; always greater than zero once persisted.
    pub points: Points,
    /// Why the award was written.
    pub reason: AwardReason,
    /// Award timestamp in milliseconds since epoch.
    pub ts_ms: TsMs,
}

/// Award payload produced by the engines before the runtime stamps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardDraft {
    /// Member the points go to.
    pub user_id: UserId,
    /// Points earned. Zero drafts never reach the ledger.
    pub points: Points,
    /// Why the points were earned.
    pub reason: AwardReason,
}

impl AwardDraft {
    /// Stamps the draft into a persistable record.
    pub fn into_record(self, ts_ms: TsMs) -> AwardRecord {
        AwardRecord {
            user_id: self.user_id,
            points: self.points,
            reason: self.reason,
            ts_ms,
        }
    }
}

/// One row of the derived ranking. Recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    /// Ranked member.
    pub user_id: UserId,
    /// Sum of all their ledger rows.
    pub total_points: u64,
}
