//! Dates in the calendars used by climate model output, and decoding of CF style numeric time
//! coordinates ("days since 1850-01-01") into those dates.
//!
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::errors::{Error, Result};

/// Largest magnitude of a day number dates are computed for, a little over 260,000 years either
/// side of year 0
const MAX_DAY_NUMBER: i64 = 95_000_000;

/// chrono's day number of 0000-01-01, counting 0001-01-01 as day 1
const GREGORIAN_EPOCH: i64 = -365;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl Date {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Calendar {
    /// Gregorian leap rules extended to all years. Also used for "standard" and "gregorian",
    /// which only differ from this before 1582.
    ProlepticGregorian,
    Julian,
    NoLeap,
    AllLeap,
    Day360,
}

impl Calendar {
    /// Count of days since 0000-01-01 in this calendar. Fails for dates that don't exist in it.
    pub fn day_number(&self, date: Date) -> Result<i64> {
        let number = match self {
            Calendar::ProlepticGregorian => {
                NaiveDate::from_ymd_opt(date.year, date.month, date.day)
                    .map(|date| i64::from(date.num_days_from_ce()) - GREGORIAN_EPOCH)
            }
            Calendar::Julian => JULIAN.day_number(date),
            Calendar::NoLeap => NO_LEAP.day_number(date),
            Calendar::AllLeap => ALL_LEAP.day_number(date),
            Calendar::Day360 => {
                let valid = (1..=12).contains(&date.month) && (1..=30).contains(&date.day);
                valid.then(|| {
                    i64::from(date.year) * 360
                        + i64::from(date.month - 1) * 30
                        + i64::from(date.day - 1)
                })
            }
        };

        number.ok_or_else(|| {
            Error::TimeUnits(format!("{date} is not a date in the {self} calendar"))
        })
    }

    /// Inverse of `day_number`
    pub fn date(&self, number: i64) -> Result<Date> {
        let out_of_range = || Error::TimeUnits(format!("day {number} is out of range"));
        if number.abs() > MAX_DAY_NUMBER {
            return Err(out_of_range());
        }

        let date = match self {
            Calendar::ProlepticGregorian => i32::try_from(number + GREGORIAN_EPOCH)
                .ok()
                .and_then(NaiveDate::from_num_days_from_ce_opt)
                .map(|date| Date::new(date.year(), date.month(), date.day())),
            Calendar::Julian => JULIAN.date(number),
            Calendar::NoLeap => NO_LEAP.date(number),
            Calendar::AllLeap => ALL_LEAP.date(number),
            Calendar::Day360 => {
                let year = number.div_euclid(360);
                let doy = number.rem_euclid(360);
                i32::try_from(year)
                    .ok()
                    .map(|year| Date::new(year, (doy / 30 + 1) as u32, (doy % 30 + 1) as u32))
            }
        };

        date.ok_or_else(out_of_range)
    }

    /// Move `date` by `days` days, which may be negative.
    pub fn shift(&self, date: Date, days: i64) -> Result<Date> {
        let number = self
            .day_number(date)?
            .checked_add(days)
            .ok_or_else(|| Error::TimeUnits(format!("{date} shifted by {days} days overflows")))?;

        self.date(number)
    }
}

/// Leap rule of a calendar whose months are the Gregorian ones, used for the calendars chrono
/// has no notion of.
struct YearRule {
    is_leap: fn(i64) -> bool,

    /// Days from 0000-01-01 to January 1st of a year
    days_before: fn(i64) -> i64,

    mean_length: f64,
}

const JULIAN: YearRule = YearRule {
    is_leap: every_fourth_year,
    days_before: days_before_julian,
    mean_length: 365.25,
};

const NO_LEAP: YearRule = YearRule {
    is_leap: never,
    days_before: days_before_no_leap,
    mean_length: 365.0,
};

const ALL_LEAP: YearRule = YearRule {
    is_leap: always,
    days_before: days_before_all_leap,
    mean_length: 366.0,
};

fn every_fourth_year(year: i64) -> bool {
    year.rem_euclid(4) == 0
}

fn never(_: i64) -> bool {
    false
}

fn always(_: i64) -> bool {
    true
}

fn days_before_julian(year: i64) -> i64 {
    365 * year + (year + 3).div_euclid(4)
}

fn days_before_no_leap(year: i64) -> i64 {
    365 * year
}

fn days_before_all_leap(year: i64) -> i64 {
    366 * year
}

impl YearRule {
    fn day_number(&self, date: Date) -> Option<i64> {
        let year = i64::from(date.year);
        let leap = (self.is_leap)(year);
        let ordinal = NaiveDate::from_ymd_opt(model_year(leap), date.month, date.day)?.ordinal0();

        Some((self.days_before)(year) + i64::from(ordinal))
    }

    fn date(&self, number: i64) -> Option<Date> {
        let mut year = (number as f64 / self.mean_length).floor() as i64;
        while (self.days_before)(year) > number {
            year -= 1;
        }
        while (self.days_before)(year + 1) <= number {
            year += 1;
        }

        let ordinal = u32::try_from(number - (self.days_before)(year)).ok()?;
        let date = NaiveDate::from_yo_opt(model_year((self.is_leap)(year)), ordinal + 1)?;

        Some(Date::new(i32::try_from(year).ok()?, date.month(), date.day()))
    }
}

/// A Gregorian year with the same month lengths as a leap or common year
fn model_year(leap: bool) -> i32 {
    if leap {
        2000
    } else {
        2001
    }
}

impl FromStr for Calendar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "gregorian" | "proleptic_gregorian" => Ok(Calendar::ProlepticGregorian),
            "julian" => Ok(Calendar::Julian),
            "noleap" | "365_day" => Ok(Calendar::NoLeap),
            "all_leap" | "366_day" => Ok(Calendar::AllLeap),
            "360_day" => Ok(Calendar::Day360),
            _ => Err(Error::TimeUnits(format!("unsupported calendar: {s}"))),
        }
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Calendar::ProlepticGregorian => "proleptic_gregorian",
            Calendar::Julian => "julian",
            Calendar::NoLeap => "noleap",
            Calendar::AllLeap => "all_leap",
            Calendar::Day360 => "360_day",
        };
        f.write_str(name)
    }
}

/// A parsed CF time units string, e.g. "days since 1850-01-01 00:00:00"
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeUnits {
    /// Length of one unit, in days
    pub unit: f64,

    pub reference: Date,

    /// Time of day of the reference, as a fraction of a day
    pub reference_offset: f64,
}

impl TimeUnits {
    /// Decode a numeric time value to the date it falls on.
    ///
    /// Missing (NaN) values and values too far from the reference, such as an unmasked fill
    /// value, are errors.
    ///
    pub fn decode(&self, value: f64, calendar: Calendar) -> Result<Date> {
        let days = (value * self.unit + self.reference_offset).floor();
        if !days.is_finite() || days.abs() > MAX_DAY_NUMBER as f64 {
            return Err(Error::TimeUnits(format!("time value {value} is not a valid date")));
        }

        calendar.shift(self.reference, days as i64)
    }
}

impl FromStr for TimeUnits {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::TimeUnits(s.to_string());
        let (unit, reference) = s.trim().split_once(" since ").ok_or_else(invalid)?;
        let unit = match unit.trim().to_lowercase().as_str() {
            "days" | "day" | "d" => 1.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 1.0 / 24.0,
            "minutes" | "minute" | "mins" | "min" => 1.0 / 1440.0,
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0 / 86400.0,
            _ => return Err(invalid()),
        };

        let reference = parse_reference(reference).ok_or_else(invalid)?;
        let seconds = f64::from(reference.num_seconds_from_midnight())
            + f64::from(reference.nanosecond()) / 1e9;

        Ok(Self {
            unit,
            reference: Date::new(reference.year(), reference.month(), reference.day()),
            reference_offset: seconds / 86400.0,
        })
    }
}

/// Parse the reference of a units string, e.g. "1850-01-01", "1850-1-1 00:00:00.0" or
/// "1900-01-01T12:00". A trailing time zone is ignored.
fn parse_reference(reference: &str) -> Option<NaiveDateTime> {
    let reference = reference.trim().replace('T', " ");
    let mut parts = reference.split_whitespace();
    let date = parts.next()?;

    match parts.next() {
        None => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0),
        Some(clock) => {
            let text = format!("{date} {clock}");
            NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M"))
                .ok()
        }
    }
}
