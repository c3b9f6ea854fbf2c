//! Chat-activity points accrual: per-user cooldown, batching, and epoch flush.

use hashbrown::HashMap;

use crate::{
    award::AwardDraft,
    types::{AwardReason, Points, TsMs, UserId},
};

/// Reward for the k-th qualifying message of an epoch; out of range earns 0.
pub const REWARD_SCHEDULE: [Points; 9] = [25, 20, 15, 10, 10, 5, 5, 5, 5];

/// Tunables for the accrual engine.
#[derive(Debug, Clone)]
pub struct AccrualConfig {
    /// Messages shorter than this touch the cooldown clock but earn nothing.
    pub min_content_len: usize,
    /// Minimum spacing between two reward-qualifying messages.
    pub cooldown_ms: u64,
    /// Delay between scheduling a flush and the flush firing.
    pub epoch_ms: u64,
    /// Hard cap on unflushed points per epoch.
    pub max_points_per_epoch: Points,
    /// Per-epoch reward schedule indexed by qualifying-message count.
    pub reward_schedule: Vec<Points>,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            min_content_len: 10,
            cooldown_ms: 30_000,
            epoch_ms: 3_600_000,
            max_points_per_epoch: 100,
            reward_schedule: REWARD_SCHEDULE.to_vec(),
        }
    }
}

/// Unflushed accrual state for one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccrualState {
    /// Instant of the last observed message, qualifying or not.
    pub last_message_ts_ms: TsMs,
    /// Points earned but not yet flushed; never exceeds the epoch cap.
    pub accumulated_points: Points,
    /// Qualifying messages counted in the current epoch.
    pub messages_in_window: u32,
    /// True from flush scheduling until the flush fires.
    pub flush_scheduled: bool,
}

/// Inbound chat-activity event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatActivity {
    /// Author of the message.
    pub user_id: UserId,
    /// Length of the message content in characters.
    pub content_len: usize,
    /// When the message was observed.
    pub ts_ms: TsMs,
}

/// What [`AccrualEngine::record_activity`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Below the minimum length; cooldown clock touched, nothing earned.
    TooShort,
    /// Inside the cooldown window; cooldown clock touched, nothing earned.
    InCooldown,
    /// Qualifying message credited.
    Credited {
        /// Reward taken from the schedule (0 once the schedule is spent).
        reward: Points,
        /// Unflushed points after crediting and clamping.
        accumulated: Points,
        /// True when the caller must now schedule this user's epoch flush.
        schedule_flush: bool,
    },
}

/// Per-user cooldown and batching state machine for chat credits.
///
/// Owns all accrual state; callers must serialize [`Self::record_activity`]
/// and [`Self::flush`] for the same user (the runtime's single-writer loop
/// does this).
#[derive(Debug, Default)]
pub struct AccrualEngine {
    config: AccrualConfig,
    states: HashMap<UserId, UserAccrualState>,
}

impl AccrualEngine {
    /// Creates an engine with the given tunables.
    pub fn new(config: AccrualConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &AccrualConfig {
        &self.config
    }

    /// Current state for `user_id`, if any activity has been observed.
    pub fn state(&self, user_id: UserId) -> Option<&UserAccrualState> {
        self.states.get(&user_id)
    }

    /// Feeds one chat-activity event through the state machine.
    ///
    /// Non-qualifying messages (too short, or inside the cooldown window)
    /// still touch `last_message_ts_ms`, so a burst of spam resets the
    /// window instead of queuing future credit.
    pub fn record_activity(&mut self, event: &ChatActivity) -> RecordOutcome {
        let now = event.ts_ms;
        let cooldown = self.config.cooldown_ms;
        let first_observation = !self.states.contains_key(&event.user_id);
        let state = self
            .states
            .entry(event.user_id)
            .or_insert_with(|| UserAccrualState {
                // Backdated so the very first message is never cooldown-blocked.
                last_message_ts_ms: now.saturating_sub(cooldown),
                accumulated_points: 0,
                messages_in_window: 0,
                flush_scheduled: false,
            });

        if event.content_len < self.config.min_content_len {
            state.last_message_ts_ms = now;
            return RecordOutcome::TooShort;
        }

        // The backdated timestamp keeps a first message from being
        // cooldown-blocked; the explicit check covers clocks within one
        // cooldown of zero, where the backdating saturates.
        if !first_observation && now.saturating_sub(state.last_message_ts_ms) < cooldown {
            state.last_message_ts_ms = now;
            return RecordOutcome::InCooldown;
        }

        let reward = self
            .config
            .reward_schedule
            .get(state.messages_in_window as usize)
            .copied()
            .unwrap_or(0);
        state.accumulated_points = state
            .accumulated_points
            .saturating_add(reward)
            .min(self.config.max_points_per_epoch);
        state.messages_in_window += 1;
        state.last_message_ts_ms = now;

        let schedule_flush = !state.flush_scheduled;
        if schedule_flush {
            state.flush_scheduled = true;
        }

        RecordOutcome::Credited {
            reward,
            accumulated: state.accumulated_points,
            schedule_flush,
        }
    }

    /// Ends the user's accrual epoch, returning the award to persist.
    ///
    /// Captures the accumulated total and resets points, window count, and
    /// the flush flag in one step. Returns `None` when nothing was earned;
    /// the window count resets regardless, so the reward schedule restarts
    /// every epoch.
    pub fn flush(&mut self, user_id: UserId) -> Option<AwardDraft> {
        let state = self.states.get_mut(&user_id)?;
        let earned = state.accumulated_points;
        state.accumulated_points = 0;
        state.messages_in_window = 0;
        state.flush_scheduled = false;

        (earned > 0).then_some(AwardDraft {
            user_id,
            points: earned,
            reason: AwardReason::ChatActivity,
        })
    }
}
