//! Daily delivery slot arithmetic.
//!
//! Postcards become visible at 00:00 India Standard Time, which is 18:30 UTC.
//! A postcard sent at instant `t` is scheduled for the first slot strictly
//! after `t`, so it waits more than zero and at most 24 hours.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

/// Hour (UTC) of the daily delivery slot.
pub const DELIVERY_HOUR_UTC: i64 = 18;
/// Minute (UTC) of the daily delivery slot.
pub const DELIVERY_MINUTE_UTC: i64 = 30;

fn slot_offset() -> TimeDelta {
    TimeDelta::hours(DELIVERY_HOUR_UTC) + TimeDelta::minutes(DELIVERY_MINUTE_UTC)
}

/// Next delivery slot strictly after `now`.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use postcards::domain::next_delivery_instant;
///
/// let morning = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
/// assert_eq!(
///     next_delivery_instant(morning),
///     Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap(),
/// );
///
/// let evening = Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap();
/// assert_eq!(
///     next_delivery_instant(evening),
///     Utc.with_ymd_and_hms(2024, 3, 2, 18, 30, 0).unwrap(),
/// );
/// ```
#[must_use]
pub fn next_delivery_instant(now: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::default()).and_utc();
    let today_slot = midnight + slot_offset();
    if now < today_slot {
        today_slot
    } else {
        today_slot + TimeDelta::days(1)
    }
}
