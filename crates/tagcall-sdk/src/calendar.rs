//! Calendar arithmetic for timestamp slots
//!
//! Numeric dates count whole seconds since 0001-01-01T00:00:00 on the
//! proleptic Gregorian calendar (day 0 is 0001-01-01). [`decompose`] and
//! [`compose`] are pure integer arithmetic and exact inverses of each other
//! for integral inputs.
//!
//! Converting between broken-down time and an absolute instant goes through
//! the local time zone.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{
    DateTime, Datelike, Local, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Timelike,
    Utc,
};

use crate::value::Tm;

/// Seconds in a calendar day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAY: i64 = 719_162;

/// Largest numeric date, 9999-12-31T23:59:59. [`decompose`] clamps its
/// input to `-MAX_DATE_SECONDS..=MAX_DATE_SECONDS`.
pub const MAX_DATE_SECONDS: i64 = 315_537_897_599;

// ============================================================================
// Numeric date <-> broken-down time
// ============================================================================

/// Split a numeric date into broken-down fields.
///
/// The fractional part is discarded. Weekday, day-of-year and DST fields are
/// left zero. Negative inputs count backwards from 0001-01-01 using floor
/// division. Inputs beyond [`MAX_DATE_SECONDS`] in either direction clamp
/// to the bound; NaN reads as day 0.
pub fn decompose(seconds: f64) -> Tm {
    let total = (seconds as i64).clamp(-MAX_DATE_SECONDS, MAX_DATE_SECONDS);
    let days = total.div_euclid(SECONDS_PER_DAY);
    let rem = total.rem_euclid(SECONDS_PER_DAY);
    let (year, month, day) = days_to_date(days - UNIX_EPOCH_DAY);

    Tm {
        sec: (rem % 3600 % 60) as i32,
        min: (rem % 3600 / 60) as i32,
        hour: (rem / 3600) as i32,
        mday: day as i32,
        mon: month as i32 - 1,
        year: (year - 1900) as i32,
        wday: 0,
        yday: 0,
        isdst: 0,
    }
}

/// Re-encode broken-down fields as a numeric date.
///
/// Out-of-range months, days, hours, minutes and seconds carry into the
/// next larger unit.
pub fn compose(tm: &Tm) -> f64 {
    let mon = i64::from(tm.mon);
    let year = i64::from(tm.year) + 1900 + mon.div_euclid(12);
    let month = (mon.rem_euclid(12) + 1) as u32;
    let days = days_from_date(year, month, 1) + UNIX_EPOCH_DAY + i64::from(tm.mday) - 1;
    let seconds = days * SECONDS_PER_DAY
        + i64::from(tm.hour) * 3600
        + i64::from(tm.min) * 60
        + i64::from(tm.sec);
    seconds as f64
}

/// Convert days since 1970-01-01 to (year, month, day).
/// Uses the algorithm from Howard Hinnant's date library.
pub fn days_to_date(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

/// Convert (year, month, day) to days since 1970-01-01.
pub fn days_from_date(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u32;
    let mp = if month > 2 { month - 3 } else { month + 9 };
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe as i64 - 719468
}

// ============================================================================
// Broken-down time <-> instant
// ============================================================================

/// Interpret broken-down fields as local time.
///
/// Fields are normalized the way C `mktime` does. A wall-clock time skipped
/// by a forward transition is read with the offset in force before it, so
/// it lands past the gap (02:30 on a spring-forward night becomes 03:30).
/// An ambiguous time resolves to its earlier instant. Fields outside the
/// representable range yield `UNIX_EPOCH`.
pub fn local_instant(tm: &Tm) -> SystemTime {
    naive_from_tm(tm)
        .and_then(|naive| match Local.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                Some(dt.with_timezone(&Utc))
            }
            LocalResult::None => skip_gap(naive),
        })
        .map(SystemTime::from)
        .unwrap_or(UNIX_EPOCH)
}

fn skip_gap(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    let before = naive.checked_sub_signed(TimeDelta::try_days(1)?)?;
    let offset = Local.offset_from_utc_datetime(&before).local_minus_utc();
    let utc = naive.checked_sub_signed(TimeDelta::try_seconds(i64::from(offset))?)?;
    Some(Utc.from_utc_datetime(&utc))
}

/// Break an instant down into local time. Sub-second precision is dropped.
///
/// Returns `None` for instants outside the supported calendar range.
pub fn local_tm(instant: SystemTime) -> Option<Tm> {
    let seconds = match instant.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).ok()?,
        Err(before) => {
            let before = before.duration();
            let whole = i64::try_from(before.as_secs()).ok()?;
            -whole - i64::from(before.subsec_nanos() > 0)
        }
    };
    let utc = DateTime::from_timestamp(seconds, 0)?;
    let dt = Local.from_utc_datetime(&utc.naive_utc());
    Some(Tm {
        sec: dt.second().min(59) as i32,
        min: dt.minute() as i32,
        hour: dt.hour() as i32,
        mday: dt.day() as i32,
        mon: dt.month0() as i32,
        year: dt.year() - 1900,
        wday: dt.weekday().num_days_from_sunday() as i32,
        yday: dt.ordinal0() as i32,
        isdst: 0,
    })
}

fn naive_from_tm(tm: &Tm) -> Option<NaiveDateTime> {
    let mon = i64::from(tm.mon);
    let year = i32::try_from(i64::from(tm.year) + 1900 + mon.div_euclid(12)).ok()?;
    let month = (mon.rem_euclid(12) + 1) as u32;
    let offset = (i64::from(tm.mday) - 1) * SECONDS_PER_DAY
        + i64::from(tm.hour) * 3600
        + i64::from(tm.min) * 60
        + i64::from(tm.sec);

    NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::try_seconds(offset)?)
}
