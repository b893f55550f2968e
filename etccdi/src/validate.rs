//! Checks and known corrections applied to each member's series before aggregation.
//!
use tracing::{debug, warn};

use crate::{
    errors::{Error, Result},
    field::TimeSeries,
    index::Index,
    source::Source,
};

/// Number of days the time axis of an offset index is moved back by
pub const CALENDAR_OFFSET_DAYS: i64 = 31;

/// Fail if `series` contains missing values, unless they are expected for `index` in files
/// from `source`, in which case they are only logged.
///
pub fn check_missing(
    series: &TimeSeries,
    index: Index,
    source: Source,
    member: &str,
) -> Result<()> {
    if !series.has_missing() {
        return Ok(());
    }

    if source.allows_missing(index) {
        warn!(%index, member, "nan found");
        Ok(())
    } else {
        Err(Error::MissingValues {
            index,
            member: member.to_string(),
        })
    }
}

/// Undo the known one month offset of some monthly files.
///
/// A file starting in February is only expected for indices with a known calendar offset;
/// their time axis is moved back by `CALENDAR_OFFSET_DAYS`. For any other index a February
/// start is an error. Other starts are left alone, annual files are commonly stamped mid-year.
///
pub fn correct_calendar(series: TimeSeries, index: Index, member: &str) -> Result<TimeSeries> {
    let first = match series.times.first() {
        Some(first) => *first,
        None => return Ok(series),
    };

    match first.month {
        2 if index.has_calendar_offset() => {
            debug!(%index, member, "fixing time shift");
            let calendar = series.calendar;
            let times = series
                .times
                .iter()
                .map(|date| calendar.shift(*date, -CALENDAR_OFFSET_DAYS))
                .collect::<Result<Vec<_>>>()?;

            Ok(TimeSeries { times, ..series })
        }
        2 => Err(Error::CalendarStart {
            index,
            member: member.to_string(),
            month: 2,
        }),
        _ => Ok(series),
    }
}
