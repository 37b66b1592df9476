//! Julian day and calendar conversions.
//!
//! The internal time scale of both models is a continuous julian day count with a
//! fractional day part. The calendar legwork is delegated to `chrono`; these wrappers
//! keep the fractional arithmetic and the rollover behavior in one place.
use chrono::{Datelike, NaiveDate};

use crate::errors::Error;
use crate::headers::YmdsTime;

/// Difference between a julian day number and chrono's day count from 0001-01-01.
const JULIAN_CE_OFFSET: f64 = 1_721_424.5;

/// Julian day of the Unix epoch, 1970-01-01 00:00:00 UTC.
pub const UNIX_EPOCH_JULIAN: f64 = 2_440_587.5;

/// Convert a calendar date and time of day to a fractional julian day.
/// ```
/// # use rayvol_core::tm::cal_to_jul;
/// assert_eq!(cal_to_jul(1970, 1, 1, 0, 0, 0.0).unwrap(), 2440587.5);
/// assert_eq!(cal_to_jul(2000, 1, 1, 12, 0, 0.0).unwrap(), 2451545.0);
/// ```
pub fn cal_to_jul(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: f64,
) -> Result<f64, Error> {
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| Error::BadCalendarTime {
        msg: format!("{:04}/{:02}/{:02} is not a calendar date", year, month, day),
    })?;
    Ok(date.num_days_from_ce() as f64
        + JULIAN_CE_OFFSET
        + hour as f64 / 24.0
        + minute as f64 / 1440.0
        + second / 86400.0)
}

/// Convert a fractional julian day back to `(year, month, day, hour, minute, second)`.
///
/// Seconds carry the fractional part. Rounding at the fraction edges is normalized, so
/// a time a hair under midnight comes back as 0:00:00 of the next day rather than
/// 24:00:00 of the previous one.
pub fn jul_to_cal(julday: f64) -> Result<(i32, u32, u32, u32, u32, f64), Error> {
    if !julday.is_finite() {
        return Err(Error::BadCalendarTime { msg: format!("{} is not a time", julday) });
    }
    let shifted = julday + 0.5;
    let mut days = shifted.floor();
    let mut frac = shifted - days;

    let mut hour = (frac * 24.0).floor();
    frac = frac * 24.0 - hour;
    let mut minute = (frac * 60.0).floor();
    let mut second = (frac * 60.0 - minute) * 60.0;
    if second >= 60.0 {
        second = 0.0;
        minute += 1.0;
    }
    if minute >= 60.0 {
        minute = 0.0;
        hour += 1.0;
    }
    if hour >= 24.0 {
        hour = 0.0;
        days += 1.0;
    }

    if days.abs() > i32::MAX as f64 {
        return Err(Error::BadCalendarTime { msg: format!("julian day {} is out of range", julday) });
    }
    let date = NaiveDate::from_num_days_from_ce_opt(days as i32 - 1_721_425)
        .ok_or_else(|| Error::BadCalendarTime { msg: format!("julian day {} is out of range", julday) })?;
    Ok((date.year(), date.month(), date.day(), hour as u32, minute as u32, second))
}

impl YmdsTime {
    /// The fractional julian day this header time denotes.
    pub fn to_julian(&self) -> Result<f64, Error> {
        let sec = self.sec as f64 + self.msec as f64 * 0.001;
        cal_to_jul(self.year, self.month as u32, self.day as u32, 0, 0, sec)
    }

    /// Shift the time by `dt` days, renormalizing the calendar fields.
    pub fn incr(&mut self, dt: f64) -> Result<(), Error> {
        let t = self.to_julian()? + dt;
        let (year, month, day, hour, minute, second) = jul_to_cal(t)?;
        let isec = second.floor();
        self.sec = (hour * 3600 + minute * 60) as i32 + isec as i32;
        self.msec = ((second - isec) * 1000.0).round() as u32;
        self.year = year;
        self.month = month as i32;
        self.day = day as i32;
        Ok(())
    }
}
