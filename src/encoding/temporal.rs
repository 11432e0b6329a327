//! # Temporal Value Arithmetic
//!
//! Calendar and tick conversions for the date and time kinds. The codec
//! itself moves raw integers (epoch days, epoch seconds, ticks); these
//! helpers exist so callers and tests can go between civil time and the
//! integers the wire carries without pulling a calendar crate into a codec.
//!
//! ## Canonical sub-second unit
//!
//! `DateTime64(P)` and `Time64(P)` travel as `i64` counts of `10^-P` second
//! units. In memory the codec normalizes to 100 ns ticks
//! ([`TICKS_PER_SECOND`] = 10^7 per second):
//!
//! | P | 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9 |
//! |---|---|---|---|---|---|---|---|---|---|---|
//! | read | ×10⁷ | ×10⁶ | ×10⁵ | ×10⁴ | ×10³ | ×10² | ×10 | ×1 | ÷10 | ÷100 |
//! | write | ÷10⁷ | ÷10⁶ | ÷10⁵ | ÷10⁴ | ÷10³ | ÷10² | ÷10 | ×1 | ×10 | ×100 |
//!
//! Precisions 8 and 9 are finer than the tick unit: reading divides and
//! discards sub-tick digits, so they are lossy. Precisions outside 0..=9
//! are rejected.
//!
//! ## Error Handling
//!
//! Rescaling returns `eyre::Result`:
//! - "unsupported precision 12: must be 0..=9"
//! - "value out of range at precision 0" (multiplication overflow)

use eyre::{bail, ensure, Result};

use crate::config::{MAX_PRECISION, TICKS_PER_SECOND};

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Converts a civil date to days since 1970-01-01. Dates before the epoch
/// yield negative counts.
pub fn days_from_civil(year: i32, month: u32, day: u32) -> i32 {
    let mut days: i32 = 0;

    if year >= 1970 {
        for y in 1970..year {
            days += if is_leap_year(y) { 366 } else { 365 };
        }
    } else {
        for y in year..1970 {
            days -= if is_leap_year(y) { 366 } else { 365 };
        }
    }

    for m in 1..month {
        days += days_in_month(year, m) as i32;
    }

    days + day as i32 - 1
}

/// Converts days since 1970-01-01 back to a civil (year, month, day).
pub fn civil_from_days(days: i32) -> (i32, u32, u32) {
    let mut remaining = days;
    let mut year = 1970;

    if remaining >= 0 {
        loop {
            let in_year = if is_leap_year(year) { 366 } else { 365 };
            if remaining < in_year {
                break;
            }
            remaining -= in_year;
            year += 1;
        }
    } else {
        while remaining < 0 {
            year -= 1;
            remaining += if is_leap_year(year) { 366 } else { 365 };
        }
    }

    let mut month = 1;
    loop {
        let in_month = days_in_month(year, month) as i32;
        if remaining < in_month {
            break;
        }
        remaining -= in_month;
        month += 1;
    }

    (year, month, remaining as u32 + 1)
}

/// Seconds in a clock reading. The sign of a negative `Time` value applies
/// to the whole reading, so callers negate the result rather than the parts.
pub fn seconds_from_hms(hours: i64, minutes: i64, seconds: i64) -> i64 {
    hours * 3600 + minutes * 60 + seconds
}

fn scale_factor(precision: u8) -> Result<(i64, bool)> {
    ensure!(
        precision <= MAX_PRECISION,
        "unsupported precision {}: must be 0..={}",
        precision,
        MAX_PRECISION
    );
    // (factor, reader multiplies). Precision 7 is the tick unit itself.
    Ok(match precision {
        8 => (10, false),
        9 => (100, false),
        p => (10i64.pow(7 - p as u32), true),
    })
}

/// Normalizes a wire value at `precision` to 100 ns ticks.
pub fn ticks_from_wire(raw: i64, precision: u8) -> Result<i64> {
    let (factor, multiply) = scale_factor(precision)?;
    if multiply {
        match raw.checked_mul(factor) {
            Some(ticks) => Ok(ticks),
            None => bail!("value {} out of range at precision {}", raw, precision),
        }
    } else {
        Ok(raw / factor)
    }
}

/// Rescales 100 ns ticks to the wire unit at `precision`.
pub fn wire_from_ticks(ticks: i64, precision: u8) -> Result<i64> {
    let (factor, multiply) = scale_factor(precision)?;
    if multiply {
        Ok(ticks / factor)
    } else {
        match ticks.checked_mul(factor) {
            Some(raw) => Ok(raw),
            None => bail!("value {} out of range at precision {}", ticks, precision),
        }
    }
}
