//! Compact Reiwa-era date tokens (`YMMDD`) used as the `now` part of document keys

use chrono::{Datelike, Local, NaiveDate};

use crate::{Error, Result};

/// First Gregorian year is Reiwa 1 when subtracting this offset
const REIWA_OFFSET: i32 = 2018;

/// Format a date as a Reiwa token, e.g. 2025-05-27 -> `70527`
pub fn format_reiwa(date: NaiveDate) -> String {
    format!("{}{}", date.year() - REIWA_OFFSET, date.format("%m%d"))
}

/// Parse a Reiwa token back into a date
pub fn parse_reiwa(token: &str) -> Result<NaiveDate> {
    let invalid = || Error::Other(format!("'{}' is not a YMMDD date token", token));

    if token.len() < 5 || !token.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let (year, month_day) = token.split_at(token.len() - 4);
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month_day[..2].parse().map_err(|_| invalid())?;
    let day: u32 = month_day[2..].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year + REIWA_OFFSET, month, day).ok_or_else(invalid)
}

/// Token for today in local time
pub fn reiwa_now() -> String {
    format_reiwa(Local::now().date_naive())
}

/// Days elapsed between the token's date and `today`
pub fn days_since(token: &str, today: NaiveDate) -> Result<i64> {
    Ok((today - parse_reiwa(token)?).num_days())
}
