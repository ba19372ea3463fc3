//! Expiry arithmetic for delivered orders.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};

use crate::types::PlanDuration;

/// The instant access bought for `duration` ends, counted from `from`.
///
/// Day plans add whole days. Month plans move to the same day of the target
/// month; a day the target month doesn't have rolls over into the next one
/// (Jan 31 + 1m = Mar 3, or Mar 2 in a leap year).
///
/// Returns `None` only if the result is outside chrono's representable range.
#[must_use]
pub fn expires_at(duration: PlanDuration, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match duration {
        PlanDuration::SevenDays => from.checked_add_signed(Duration::days(7)),
        PlanDuration::FourteenDays => from.checked_add_signed(Duration::days(14)),
        PlanDuration::OneMonth => add_months_rolling_over(from, 1),
        PlanDuration::ThreeMonths => add_months_rolling_over(from, 3),
        PlanDuration::SixMonths => add_months_rolling_over(from, 6),
        PlanDuration::TwelveMonths => add_months_rolling_over(from, 12),
    }
}

/// Counts the start day from the 1st of the target month, so surplus days
/// spill into the following month.
fn add_months_rolling_over(from: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    let index = i64::from(from.year()) * 12 + i64::from(from.month0()) + i64::from(months);
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;

    let date = NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_days(Days::new(u64::from(from.day0())))?;
    Some(date.and_time(from.time()).and_utc())
}
