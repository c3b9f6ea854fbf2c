//! Shared primitive ids and the award-reason enum.

use serde::{Deserialize, Serialize};

/// Community member identifier.
pub type UserId = u64;
/// Milliseconds since the Unix epoch.
pub type TsMs = u64;
/// Point magnitude of a single award. Ledger rows are strictly positive.
pub type Points = u32;

/// Why a ledger row was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AwardReason {
    /// Batched chat-activity credits flushed at the end of an accrual epoch.
    ChatActivity,
    /// Time spent in a qualifying voice channel, awarded on session end.
    VoicePresence,
}

impl AwardReason {
    /// Stable text persisted in the `reason` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChatActivity => "chat-activity",
            Self::VoicePresence => "voice-presence",
        }
    }

    /// Parses the stable text form back into the enum.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "chat-activity" => Some(Self::ChatActivity),
            "voice-presence" => Some(Self::VoicePresence),
            _ => None,
        }
    }
}
