//! Daily-insight streaks and milestone rewards.
//!
//! Streaks advance at most once per calendar day and break after a
//! 2-day gap. Reward determination is deterministic at milestone values
//! and probabilistic otherwise.

use crate::kvstore::{KeyValueStore, KvError};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Days without an insight before a streak breaks.
pub const STREAK_BREAK_DAYS: i64 = 2;

/// Most recent insights kept in state.
pub const RECENT_INSIGHTS_CAP: usize = 10;

const STREAK_KEY: &str = "streak/state";

// ============================================================================
// State
// ============================================================================

/// One recorded insight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub content: String,
    pub category: String,
    pub recorded_at: DateTime<Utc>,
}

/// Persistent streak state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_insights: u32,
    pub last_insight_date: Option<DateTime<Utc>>,
    /// Newest first, capped at [`RECENT_INSIGHTS_CAP`].
    pub recent_insights: Vec<Insight>,
}

/// Reward tiers granted by the streak state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardTier {
    /// The very first insight ever recorded.
    FirstInsight,
    ThreeDayStreak,
    WeekStreak,
    TwoWeekStreak,
    MonthStreak,
    SixtyDayStreak,
    HundredDayStreak,
    /// Every multiple of 10 beyond 100.
    Milestone,
    Basic,
    Silver,
    Gold,
    Special,
}

// ============================================================================
// Manager
// ============================================================================

/// Tracks the insight streak, persisting state on every transition.
pub struct StreakManager {
    kv: Arc<dyn KeyValueStore>,
    state: Mutex<StreakState>,
}

impl StreakManager {
    /// Load streak state from storage, starting fresh when absent or
    /// unreadable.
    pub async fn load(kv: Arc<dyn KeyValueStore>) -> Result<Self, KvError> {
        let state = match kv.get(STREAK_KEY).await? {
            Some(value) => serde_json::from_value(value).unwrap_or_default(),
            None => StreakState::default(),
        };
        Ok(Self {
            kv,
            state: Mutex::new(state),
        })
    }

    /// Record an insight now, with a real RNG.
    pub async fn record_insight(
        &self,
        content: &str,
        category: &str,
    ) -> Result<Option<RewardTier>, KvError> {
        let mut state = self.state.lock().await;
        // The RNG must not be held across the persist await.
        let reward = {
            let mut rng = rand::thread_rng();
            record_insight_at(&mut state, content, category, Utc::now(), &mut rng)
        };
        self.persist(&state).await?;
        drop(state);
        if let Some(tier) = reward {
            info!(?tier, "streak reward earned");
        }
        Ok(reward)
    }

    /// Reset the streak if too many days have passed. Intended to run
    /// on load or resume.
    pub async fn check_streak_status(&self) -> Result<StreakState, KvError> {
        let mut state = self.state.lock().await;
        if let Some(last) = state.last_insight_date {
            let days_since = (Utc::now().date_naive() - last.date_naive()).num_days();
            if days_since >= STREAK_BREAK_DAYS && state.current_streak > 0 {
                debug!(days_since, "streak broken");
                state.current_streak = 0;
                self.persist(&state).await?;
            }
        }
        Ok(state.clone())
    }

    /// Current state snapshot.
    pub async fn state(&self) -> StreakState {
        self.state.lock().await.clone()
    }

    async fn persist(&self, state: &StreakState) -> Result<(), KvError> {
        let value = serde_json::to_value(state)?;
        self.kv.set(STREAK_KEY, value).await
    }
}

/// Apply one insight to the state at a given instant. Streaks advance
/// at most once per calendar day.
pub fn record_insight_at<R: Rng>(
    state: &mut StreakState,
    content: &str,
    category: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Option<RewardTier> {
    state.recent_insights.insert(
        0,
        Insight {
            content: content.to_string(),
            category: category.to_string(),
            recorded_at: now,
        },
    );
    state.recent_insights.truncate(RECENT_INSIGHTS_CAP);
    state.total_insights += 1;

    let reward = match state.last_insight_date {
        None => {
            state.current_streak = 1;
            state.longest_streak = 1;
            Some(RewardTier::FirstInsight)
        }
        Some(last) if last.date_naive() < now.date_naive() => {
            state.current_streak += 1;
            state.longest_streak = state.longest_streak.max(state.current_streak);
            determine_reward(state.current_streak, rng)
        }
        Some(_) => None,
    };
    state.last_insight_date = Some(now);
    reward
}

/// Reward for reaching a streak length. Milestones are deterministic;
/// in between, a probabilistic reward may fire.
pub fn determine_reward<R: Rng>(streak: u32, rng: &mut R) -> Option<RewardTier> {
    match streak {
        3 => return Some(RewardTier::ThreeDayStreak),
        7 => return Some(RewardTier::WeekStreak),
        14 => return Some(RewardTier::TwoWeekStreak),
        30 => return Some(RewardTier::MonthStreak),
        60 => return Some(RewardTier::SixtyDayStreak),
        100 => return Some(RewardTier::HundredDayStreak),
        s if s > 100 && s % 10 == 0 => return Some(RewardTier::Milestone),
        _ => {}
    }

    let mut chance = 0.30;
    if streak > 10 {
        chance += 0.10;
    }
    if streak > 20 {
        chance += 0.10;
    }
    if rng.gen_bool(chance) {
        [
            RewardTier::Basic,
            RewardTier::Silver,
            RewardTier::Gold,
            RewardTier::Special,
        ]
        .choose(rng)
        .copied()
    } else {
        None
    }
}

/// Hours left before the streak breaks, as a pure function of the last
/// insight time. Negative when the deadline has already passed.
pub fn hours_remaining_to_maintain_streak(
    last_insight: DateTime<Utc>,
    now: DateTime<Utc>,
) -> i64 {
    let deadline = last_insight
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc() + Duration::days(STREAK_BREAK_DAYS))
        .unwrap_or(now);
    (deadline - now).num_hours()
}
