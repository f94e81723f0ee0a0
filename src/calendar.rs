//! Calendar helpers on naive (wall-clock) datetimes.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

/// Finest unit a cron ticks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grain {
    Second,
    Minute,
}

impl Grain {
    pub fn duration(self) -> Duration {
        match self {
            Grain::Second => Duration::seconds(1),
            Grain::Minute => Duration::minutes(1),
        }
    }
}

/// Truncate `dt` to the start of its `grain`.
pub fn start_of(grain: Grain, dt: NaiveDateTime) -> NaiveDateTime {
    let time = match grain {
        Grain::Second => dt.time().with_nanosecond(0).unwrap_or_else(|| dt.time()),
        Grain::Minute => NaiveTime::from_hms_opt(dt.hour(), dt.minute(), 0).unwrap_or_else(|| dt.time()),
    };
    NaiveDateTime::new(dt.date(), time)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_next| first_next.pred_opt())
        .map_or(31, |last| last.day())
}

pub fn last_day_of_month(date: NaiveDate) -> u32 {
    days_in_month(date.year(), date.month())
}

/// Last Monday-Friday of the month containing `date`.
pub fn last_weekday_of_month(date: NaiveDate) -> u32 {
    let last = last_day_of_month(date);
    match NaiveDate::from_ymd_opt(date.year(), date.month(), last).map(|d| d.weekday()) {
        Some(Weekday::Sat) => last - 1,
        Some(Weekday::Sun) => last - 2,
        _ => last,
    }
}

/// Weekday closest to `day` within the same month.
///
/// Saturday moves back to Friday unless that leaves the month, then forward
/// to Monday; Sunday moves forward to Monday unless that leaves the month,
/// then back to Friday. Days past the end of the month have no nearest weekday.
pub fn nearest_weekday(year: i32, month: u32, day: i32) -> Option<u32> {
    let day = u32::try_from(day).ok()?;
    let last = days_in_month(year, month);
    if day == 0 || day > last {
        return None;
    }
    let resolved = match NaiveDate::from_ymd_opt(year, month, day)?.weekday() {
        Weekday::Sat if day > 1 => day - 1,
        Weekday::Sat => day + 2,
        Weekday::Sun if day < last => day + 1,
        Weekday::Sun => day - 2,
        _ => day,
    };
    Some(resolved)
}

/// 1-based occurrence of `date`'s weekday within its month.
pub fn weekday_occurrence(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7 + 1
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn end_of_day(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(23, 59, 59)
}

pub fn start_of_year(year: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1).map(start_of_day)
}

pub fn end_of_year(year: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 12, 31).and_then(end_of_day)
}

/// Midnight on the first day of the month after `date`.
pub fn start_of_next_month(date: NaiveDate) -> Option<NaiveDateTime> {
    let (year, month) = if date.month() == 12 { (date.year() + 1, 1) } else { (date.year(), date.month() + 1) };
    NaiveDate::from_ymd_opt(year, month, 1).map(start_of_day)
}

/// Last second of the month before `date`.
pub fn end_of_previous_month(date: NaiveDate) -> Option<NaiveDateTime> {
    date.with_day(1)?.pred_opt().and_then(end_of_day)
}
