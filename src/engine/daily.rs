//! Daily login streak and reward schedule.

use crate::domain::{Amount, GameDate, PlayerRecord};

/// Longest streak the schedule rewards; further consecutive days stay here.
pub const STREAK_CAP: i64 = 30;

/// Reward per streak day: day N of a streak pays `N * 10`.
pub const STREAK_REWARD_STEP: i64 = 10;

/// What a daily-login check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyLoginOutcome {
    /// False when today's reward was already processed.
    pub applied: bool,
    pub streak: i64,
    pub reward: Amount,
}

/// Process the daily login reward for `today`.
///
/// Idempotent per calendar day: a second call with the same `today` is a
/// no-op. A login on the day after the last processed one extends the
/// streak (capped at [`STREAK_CAP`]); any gap resets it to 1.
pub fn check_daily_login(record: &mut PlayerRecord, today: GameDate) -> DailyLoginOutcome {
    if record.last_login_date == Some(today) {
        return DailyLoginOutcome {
            applied: false,
            streak: record.login_streak,
            reward: Amount::zero(),
        };
    }

    let streak = if record.last_login_date == Some(today.prev_day()) {
        (record.login_streak + 1).min(STREAK_CAP)
    } else {
        1
    };
    let reward = Amount::from(streak * STREAK_REWARD_STEP);

    record.login_streak = streak;
    record.last_login_date = Some(today);
    record.balance += reward;

    DailyLoginOutcome {
        applied: true,
        streak,
        reward,
    }
}
