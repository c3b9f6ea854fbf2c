//! Runtime event stream payloads.

use crate::types::{AwardReason, Points, UserId};

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointsEvent {
    /// A qualifying chat message earned unflushed credit.
    Credited {
        /// Credited member.
        user_id: UserId,
        /// Reward taken from the schedule for this message.
        reward: Points,
        /// Unflushed points after the credit.
        accumulated: Points,
    },
    /// An epoch flush timer was started for this member.
    FlushScheduled {
        /// Member whose flush is pending.
        user_id: UserId,
    },
    /// An award row was persisted in the ledger.
    Awarded {
        /// Awarded member.
        user_id: UserId,
        /// Points written.
        points: Points,
        /// Why the row was written.
        reason: AwardReason,
    },
    /// A voice-presence session started counting.
    SessionStarted {
        /// Member now accruing presence time.
        user_id: UserId,
    },
    /// A voice-presence session ended; an `Awarded` event follows when it
    /// earned at least one full interval.
    SessionEnded {
        /// Member whose session closed.
        user_id: UserId,
    },
}
