//! crates/savings_core/src/progress.rs
//!
//! Progress toward a target amount and the countdown to a group's deadline.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Deadlines closer than this many days are flagged as urgent.
pub const URGENT_THRESHOLD_DAYS: i64 = 30;

/// `current / target` as a percentage, capped at 100.
///
/// Returns `None` when `target` is not positive.
pub fn progress_percentage(current: Decimal, target: Decimal) -> Option<Decimal> {
    ratio_percent(current, target).map(|p| p.min(Decimal::ONE_HUNDRED))
}

/// `current / target` rounded to the nearest whole percent, for labels.
///
/// Unlike [`progress_percentage`] this is not capped, so an over-funded goal
/// reads e.g. `150`. Returns `None` when `target` is not positive.
pub fn rounded_percent(current: Decimal, target: Decimal) -> Option<i64> {
    ratio_percent(current, target)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

fn ratio_percent(current: Decimal, target: Decimal) -> Option<Decimal> {
    if target <= Decimal::ZERO {
        return None;
    }
    current
        .checked_div(target)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// The instant a target date refers to: midnight UTC at the start of that day.
pub fn deadline_instant(target_date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&target_date.and_time(NaiveTime::default()))
}

/// Whole days left until `target_date`, rounded up.
///
/// A deadline later today (or already passed) yields zero or less.
pub fn days_remaining(target_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let millis = (deadline_instant(target_date) - now).num_milliseconds();
    let days = millis.div_euclid(MS_PER_DAY);
    if millis.rem_euclid(MS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    Remaining(i64),
    Urgent(i64),
    Expired,
}

impl DeadlineStatus {
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d <= 0 => Self::Expired,
            d if d < URGENT_THRESHOLD_DAYS => Self::Urgent(d),
            d => Self::Remaining(d),
        }
    }

    pub fn for_deadline(target_date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self::from_days(days_remaining(target_date, now))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}
