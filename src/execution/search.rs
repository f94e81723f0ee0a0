//! Wall-clock search for matching instants.
//!
//! The search runs on naive local datetimes: the coarsest mismatching field
//! is carried to its next (or previous) boundary, then the finer fields are
//! narrowed. Time-zone resolution happens one level up.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, trace};

use super::matcher::{DayMatcher, FieldMatcher};
use crate::calendar::{end_of_day, end_of_previous_month, end_of_year, start_of_day, start_of_next_month, start_of_year};
use crate::cron::Cron;
use crate::expression::FieldExpression;
use crate::field::{FieldName, FieldValue};

/// How far past the last year jump a search may wander. Weekday/date
/// coincidences repeat within this many years.
const SEARCH_HORIZON_YEARS: i32 = 28;

static ZERO: FieldExpression = FieldExpression::On(FieldValue::Int(0));
static ALWAYS: FieldExpression = FieldExpression::Always { period: 1 };

/// Compiled field matchers for one cron.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Schedule<'a> {
    second: FieldMatcher<'a>,
    minute: FieldMatcher<'a>,
    hour: FieldMatcher<'a>,
    month: FieldMatcher<'a>,
    year: Option<FieldMatcher<'a>>,
    days: DayMatcher<'a>,
}

impl<'a> Schedule<'a> {
    pub fn new(cron: &'a Cron) -> Self {
        let field = |name: FieldName, fallback: &'static FieldExpression, min: i32, max: i32| {
            cron.field(name).map_or(FieldMatcher::new(fallback, min, max), FieldMatcher::from_field)
        };
        let day_of_week = cron.field(FieldName::DayOfWeek).map(|dow| {
            let numbering = dow.constraints.weekday_numbering().unwrap_or_default();
            (FieldMatcher::from_field(dow), numbering)
        });

        Schedule {
            second: field(FieldName::Second, &ZERO, 0, 59),
            minute: field(FieldName::Minute, &ALWAYS, 0, 59),
            hour: field(FieldName::Hour, &ALWAYS, 0, 23),
            month: field(FieldName::Month, &ALWAYS, 1, 12),
            year: cron.field(FieldName::Year).map(FieldMatcher::from_field),
            days: DayMatcher::new(cron.field(FieldName::DayOfMonth).map(FieldMatcher::from_field), day_of_week),
        }
    }

    /// Whether the wall-clock instant `at` (second precision) is selected.
    pub fn matches(&self, at: NaiveDateTime) -> bool {
        self.year.is_none_or(|year| year.matches(at.year()))
            && self.month.matches(at.month() as i32)
            && self.days.matches(at.date())
            && self.hour.matches(at.hour() as i32)
            && self.minute.matches(at.minute() as i32)
            && self.second.matches(at.second() as i32)
    }

    /// Earliest matching instant at or after `start`.
    pub fn next_after(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        let mut at = start;
        let mut horizon = start.year() + SEARCH_HORIZON_YEARS;

        loop {
            if let Some(year) = self.year {
                if !year.matches(at.year()) {
                    let Some(next) = year.next_in(at.year() + 1, year.max()) else {
                        debug!(from = %start, "year field exhausted");
                        return None;
                    };
                    at = start_of_year(next)?;
                    horizon = next + SEARCH_HORIZON_YEARS;
                    continue;
                }
            }
            if at.year() > horizon {
                debug!(from = %start, horizon, "no match before search horizon");
                return None;
            }
            if !self.month.matches(at.month() as i32) {
                at = start_of_next_month(at.date())?;
                trace!(%at, "month rollover");
                continue;
            }
            if !self.days.matches(at.date()) {
                at = start_of_day(at.date().succ_opt()?);
                continue;
            }

            let Some(hour) = self.hour.next_in(at.hour() as i32, 23) else {
                at = start_of_day(at.date().succ_opt()?);
                trace!(%at, "day rollover");
                continue;
            };
            if hour != at.hour() as i32 {
                at = at.date().and_time(time(hour, 0, 0)?);
            }

            let Some(minute) = self.minute.next_in(at.minute() as i32, 59) else {
                at = at.date().and_time(time(at.hour() as i32, 0, 0)?) + Duration::hours(1);
                trace!(%at, "hour rollover");
                continue;
            };
            if minute != at.minute() as i32 {
                at = at.date().and_time(time(at.hour() as i32, minute, 0)?);
            }

            let Some(second) = self.second.next_in(at.second() as i32, 59) else {
                at = at.date().and_time(time(at.hour() as i32, at.minute() as i32, 0)?) + Duration::minutes(1);
                continue;
            };
            return at.with_second(second as u32);
        }
    }

    /// Latest matching instant at or before `start`.
    pub fn previous_before(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        let mut at = start;
        let mut horizon = start.year() - SEARCH_HORIZON_YEARS;

        loop {
            if let Some(year) = self.year {
                if !year.matches(at.year()) {
                    let Some(previous) = year.previous_in(at.year() - 1, year.min()) else {
                        debug!(from = %start, "year field exhausted");
                        return None;
                    };
                    at = end_of_year(previous)?;
                    horizon = previous - SEARCH_HORIZON_YEARS;
                    continue;
                }
            }
            if at.year() < horizon {
                debug!(from = %start, horizon, "no match before search horizon");
                return None;
            }
            if !self.month.matches(at.month() as i32) {
                at = end_of_previous_month(at.date())?;
                trace!(%at, "month rollback");
                continue;
            }
            if !self.days.matches(at.date()) {
                at = end_of_day(at.date().pred_opt()?)?;
                continue;
            }

            let Some(hour) = self.hour.previous_in(at.hour() as i32, 0) else {
                at = end_of_day(at.date().pred_opt()?)?;
                trace!(%at, "day rollback");
                continue;
            };
            if hour != at.hour() as i32 {
                at = at.date().and_time(time(hour, 59, 59)?);
            }

            let Some(minute) = self.minute.previous_in(at.minute() as i32, 0) else {
                at = at.date().and_time(time(at.hour() as i32, 0, 0)?) - Duration::seconds(1);
                trace!(%at, "hour rollback");
                continue;
            };
            if minute != at.minute() as i32 {
                at = at.date().and_time(time(at.hour() as i32, minute, 59)?);
            }

            let Some(second) = self.second.previous_in(at.second() as i32, 0) else {
                at = at.date().and_time(time(at.hour() as i32, at.minute() as i32, 0)?) - Duration::seconds(1);
                continue;
            };
            return at.with_second(second as u32);
        }
    }
}

fn time(hour: i32, minute: i32, second: i32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(u32::try_from(hour).ok()?, u32::try_from(minute).ok()?, u32::try_from(second).ok()?)
}
