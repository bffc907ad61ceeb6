//! Quota tracking service
//!
//! Per-user rolling counters: reminders per calendar month and API calls per
//! day, with tier-derived limits and lazy rollover. Stale counters are
//! self-healed on check with a single conditional UPDATE rather than a
//! scheduled job.
//!
//! Check-then-increment is two separate calls; concurrent requests from the
//! same user can both pass the check before either increments. The overrun
//! is bounded to the race window, which is accepted.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::repositories::UserRepository;
use crate::models::user::UNLIMITED;
use crate::utils::errors::{RemindrError, Result};

/// Outcome of a quota check
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatus {
    pub allowed: bool,
    /// Units left after the call in progress; -1 when unbounded
    pub remaining: i64,
    /// -1 when unbounded
    pub limit: i64,
    /// Counter value after any rollover; may exceed `limit` after a race
    /// overrun
    pub used: i64,
    /// Start of the period the counter covers, or of the next period when
    /// the check is denied
    pub reset_at: DateTime<Utc>,
}

impl RateLimitStatus {
    fn unlimited(now: DateTime<Utc>) -> Self {
        Self {
            allowed: true,
            remaining: UNLIMITED,
            limit: UNLIMITED,
            used: 0,
            reset_at: now,
        }
    }
}

/// First instant of the month containing `now` (UTC reckoning)
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// First instant of the month after the one containing `now`
pub fn start_of_next_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// First instant of the day containing `now` (UTC reckoning)
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// First instant of the day after the one containing `now`
pub fn start_of_next_day(now: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(now) + Duration::days(1)
}

/// Pure quota decision given the current counter state.
///
/// `count` is the counter value after any rollover reset. An allowed check
/// reports `remaining` with one unit reserved for the call in progress; the
/// increment itself is a separate follow-up call.
pub fn evaluate(
    limit: i64,
    count: i64,
    period_start: DateTime<Utc>,
    next_period_start: DateTime<Utc>,
) -> RateLimitStatus {
    let remaining = limit - count;

    if remaining <= 0 {
        return RateLimitStatus {
            allowed: false,
            remaining: 0,
            limit,
            used: count,
            reset_at: next_period_start,
        };
    }

    RateLimitStatus {
        allowed: true,
        remaining: remaining - 1,
        limit,
        used: count,
        reset_at: period_start,
    }
}

/// Quota tracking service
#[derive(Debug, Clone)]
pub struct QuotaService {
    users: UserRepository,
}

impl QuotaService {
    /// Create a new QuotaService instance
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Check the monthly reminder quota for a user.
    ///
    /// May reset a stale counter as a side effect (lazy rollover).
    pub async fn check_reminder_limit(&self, user_id: Uuid) -> Result<RateLimitStatus> {
        let now = Utc::now();
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(RemindrError::UserNotFound { user_id })?;

        let limit = user.subscription_tier.reminder_limit();
        if limit == UNLIMITED {
            return Ok(RateLimitStatus::unlimited(now));
        }

        let period_start = start_of_month(now);
        let was_reset = self
            .users
            .reset_reminder_counter_if_stale(user_id, period_start)
            .await?;

        if was_reset {
            debug!(user_id = %user_id, "Monthly reminder counter rolled over");
        }

        let count = if was_reset {
            0
        } else {
            i64::from(user.reminders_count_this_month)
        };

        Ok(evaluate(limit, count, period_start, start_of_next_month(now)))
    }

    /// Record one reminder created. Atomic at the storage layer.
    pub async fn increment_reminder_count(&self, user_id: Uuid) -> Result<()> {
        self.users.increment_reminder_count(user_id).await
    }

    /// Check the daily API-call quota for a user
    pub async fn check_api_limit(&self, user_id: Uuid) -> Result<RateLimitStatus> {
        let now = Utc::now();
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(RemindrError::UserNotFound { user_id })?;

        let limit = user.subscription_tier.api_call_limit();
        if limit == UNLIMITED {
            return Ok(RateLimitStatus::unlimited(now));
        }

        let period_start = start_of_day(now);
        let was_reset = self
            .users
            .reset_api_counter_if_stale(user_id, period_start)
            .await?;

        let count = if was_reset {
            0
        } else {
            i64::from(user.api_calls_today)
        };

        Ok(evaluate(limit, count, period_start, start_of_next_day(now)))
    }

    /// Record one API call. Atomic at the storage layer.
    pub async fn increment_api_count(&self, user_id: Uuid) -> Result<()> {
        self.users.increment_api_count(user_id).await
    }

    /// Check the reminder quota and turn a denial into a `QuotaExceeded`
    /// error carrying the upgrade-prompt fields.
    pub async fn enforce_reminder_limit(&self, user_id: Uuid) -> Result<RateLimitStatus> {
        let status = self.check_reminder_limit(user_id).await?;
        if !status.allowed {
            info!(
                user_id = %user_id,
                limit = status.limit,
                used = status.used,
                "Monthly reminder limit reached"
            );
            return Err(RemindrError::QuotaExceeded {
                limit: status.limit,
                used: status.used,
                reset_at: status.reset_at,
            });
        }
        Ok(status)
    }

    /// Check the API quota and turn a denial into a `QuotaExceeded` error
    pub async fn enforce_api_limit(&self, user_id: Uuid) -> Result<RateLimitStatus> {
        let status = self.check_api_limit(user_id).await?;
        if !status.allowed {
            info!(
                user_id = %user_id,
                limit = status.limit,
                used = status.used,
                "Daily API limit reached"
            );
            return Err(RemindrError::QuotaExceeded {
                limit: status.limit,
                used: status.used,
                reset_at: status.reset_at,
            });
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_fresh_period_reserves_one_unit() {
        let now = at(2024, 1, 15, 12);
        let status = evaluate(5, 0, start_of_month(now), start_of_next_month(now));
        assert!(status.allowed);
        assert_eq!(status.remaining, 4);
        assert_eq!(status.limit, 5);
        assert_eq!(status.reset_at, at(2024, 1, 1, 0));
    }

    #[test]
    fn test_exhausted_counter_is_denied_with_next_period() {
        let now = at(2024, 1, 15, 12);
        let status = evaluate(5, 5, start_of_month(now), start_of_next_month(now));
        assert!(!status.allowed);
        assert_eq!(status.remaining, 0);
        assert_eq!(status.used, 5);
        assert_eq!(status.reset_at, at(2024, 2, 1, 0));
    }

    #[test]
    fn test_denial_reports_actual_count_after_overrun() {
        // Concurrent creates can push the counter past the limit; the denial
        // reports what was really used, not the cap.
        let now = at(2024, 1, 15, 12);
        let status = evaluate(5, 7, start_of_month(now), start_of_next_month(now));
        assert!(!status.allowed);
        assert_eq!(status.used, 7);
        assert_eq!(status.limit, 5);
    }

    #[test]
    fn test_last_unit_is_allowed_with_zero_remaining() {
        let now = at(2024, 1, 15, 12);
        let status = evaluate(5, 4, start_of_month(now), start_of_next_month(now));
        assert!(status.allowed);
        assert_eq!(status.remaining, 0);
    }

    #[test]
    fn test_rollover_resets_before_limit_evaluation() {
        // A counter at the limit from a prior month: after the conditional
        // reset the evaluation sees count=0 and allows.
        let now = at(2024, 2, 3, 9);
        let status = evaluate(5, 0, start_of_month(now), start_of_next_month(now));
        assert!(status.allowed);
        assert_eq!(status.remaining, 4);
    }

    #[test]
    fn test_month_boundaries() {
        assert_eq!(start_of_month(at(2024, 12, 31, 23)), at(2024, 12, 1, 0));
        assert_eq!(start_of_next_month(at(2024, 12, 31, 23)), at(2025, 1, 1, 0));
        assert_eq!(start_of_next_month(at(2024, 1, 1, 0)), at(2024, 2, 1, 0));
    }

    #[test]
    fn test_day_boundaries() {
        assert_eq!(start_of_day(at(2024, 3, 15, 18)), at(2024, 3, 15, 0));
        assert_eq!(start_of_next_day(at(2024, 3, 15, 18)), at(2024, 3, 16, 0));
        // Month rollover through the day boundary
        assert_eq!(start_of_next_day(at(2024, 2, 29, 5)), at(2024, 3, 1, 0));
    }

    #[test]
    fn test_unlimited_status_shape() {
        let now = Utc::now();
        let status = RateLimitStatus::unlimited(now);
        assert!(status.allowed);
        assert_eq!(status.remaining, UNLIMITED);
        assert_eq!(status.limit, UNLIMITED);
    }
}
