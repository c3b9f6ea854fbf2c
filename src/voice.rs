//! Voice-presence tracking: sessions, quorum gating, and interval awards.

use hashbrown::HashMap;

use crate::{
    award::AwardDraft,
    types::{AwardReason, Points, TsMs, UserId},
};

/// Tunables for voice-presence awards.
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// One full interval of presence earns `points_per_interval`.
    pub interval_ms: u64,
    /// Points per completed interval.
    pub points_per_interval: Points,
    /// Qualifying members a channel needs before sessions start in it.
    pub min_qualifying_members: usize,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            interval_ms: 60_000,
            points_per_interval: 1,
            min_qualifying_members: 2,
        }
    }
}

/// Occupancy metadata for one member of a voice channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMember {
    /// True for automated accounts; they never count toward quorum.
    pub is_bot: bool,
    /// Self-muted members do not count toward quorum.
    pub self_muted: bool,
    /// Self-deafened members do not count toward quorum.
    pub self_deafened: bool,
}

impl ChannelMember {
    /// A plain human member, counted toward quorum.
    pub fn human() -> Self {
        Self {
            is_bot: false,
            self_muted: false,
            self_deafened: false,
        }
    }

    fn qualifies(&self) -> bool {
        !self.is_bot && !self.self_muted && !self.self_deafened
    }
}

/// Inbound voice-state-change event.
///
/// Channel fields are occupancy snapshots taken after the change; `None`
/// means the user was not in a channel on that side of the transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceStateChange {
    /// Member whose voice state changed.
    pub user_id: UserId,
    /// Occupancy of the channel the user left, if any.
    pub previous_channel: Option<Vec<ChannelMember>>,
    /// Occupancy of the channel the user is now in, if any.
    pub new_channel: Option<Vec<ChannelMember>>,
    /// When the change was observed.
    pub ts_ms: TsMs,
}

/// Open presence session for one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceSession {
    /// When the session started counting.
    pub started_ts_ms: TsMs,
}

/// Converts voice-channel occupancy duration into point awards.
///
/// Sessions carry no timer; duration is computed when the session closes.
#[derive(Debug, Default)]
pub struct VoiceTracker {
    config: VoiceConfig,
    sessions: HashMap<UserId, VoiceSession>,
}

impl VoiceTracker {
    /// Creates a tracker with the given tunables.
    pub fn new(config: VoiceConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    /// Open session for `user_id`, if one exists.
    pub fn session(&self, user_id: UserId) -> Option<&VoiceSession> {
        self.sessions.get(&user_id)
    }

    /// Feeds one voice-state change through the tracker.
    ///
    /// Closes any open session first (returning its award when at least one
    /// full interval completed), then opens a new session iff the new
    /// channel meets quorum. A session whose start lies in the future is
    /// treated as no session and dropped without an award.
    pub fn on_state_change(&mut self, event: &VoiceStateChange) -> Option<AwardDraft> {
        let award = self.close_session(event.user_id, event.ts_ms);

        if let Some(members) = &event.new_channel {
            let qualifying = members.iter().filter(|m| m.qualifies()).count();
            if qualifying >= self.config.min_qualifying_members {
                self.sessions.insert(
                    event.user_id,
                    VoiceSession {
                        started_ts_ms: event.ts_ms,
                    },
                );
            }
        }

        award
    }

    fn close_session(&mut self, user_id: UserId, now: TsMs) -> Option<AwardDraft> {
        let session = self.sessions.remove(&user_id)?;
        if session.started_ts_ms > now || self.config.interval_ms == 0 {
            return None;
        }

        let elapsed = now - session.started_ts_ms;
        let intervals = elapsed / self.config.interval_ms;
        let points = Points::try_from(intervals)
            .ok()?
            .saturating_mul(self.config.points_per_interval);

        (points > 0).then_some(AwardDraft {
            user_id,
            points,
            reason: AwardReason::VoicePresence,
        })
    }
}
