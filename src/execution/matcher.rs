//! Per-field match predicates compiled from expression trees.
//!
//! Numeric fields (second, minute, hour, month, year) match a plain value.
//! The two day fields match a whole date, because `L`, `W`, `LW` and `#n`
//! depend on the month the date sits in. [`DayMatcher::matches`] holds the
//! day-of-month / day-of-week pairing rule.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::calendar::{last_day_of_month, last_weekday_of_month, nearest_weekday, weekday_occurrence};
use crate::constraints::WeekdayNumbering;
use crate::cron::CronField;
use crate::expression::FieldExpression;
use crate::field::FieldValue;

/// Predicate for one field over the field's native values.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldMatcher<'a> {
    expression: &'a FieldExpression,
    min: i32,
    max: i32,
}

impl<'a> FieldMatcher<'a> {
    pub fn new(expression: &'a FieldExpression, min: i32, max: i32) -> Self {
        FieldMatcher { expression, min, max }
    }

    pub fn from_field(field: CronField<'a>) -> Self {
        Self::new(field.expression, field.constraints.min(), field.constraints.max())
    }

    pub fn is_restrictive(&self) -> bool {
        self.expression.is_restrictive()
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn matches(&self, value: i32) -> bool {
        self.matches_expr(self.expression, value)
    }

    /// First matching value in `from..=to`.
    pub fn next_in(&self, from: i32, to: i32) -> Option<i32> {
        (from..=to).find(|v| self.matches(*v))
    }

    /// Last matching value in `to..=from`, searching downwards.
    pub fn previous_in(&self, from: i32, to: i32) -> Option<i32> {
        (to..=from).rev().find(|v| self.matches(*v))
    }

    fn matches_expr(&self, expression: &FieldExpression, value: i32) -> bool {
        match expression {
            FieldExpression::Always { period } => {
                (self.min..=self.max).contains(&value) && steps_onto(value - self.min, *period)
            }
            FieldExpression::On(FieldValue::Int(expected)) => value == *expected,
            FieldExpression::On(_) => false,
            FieldExpression::Between { from, to, period } => self.in_range(value, *from, *to, *period),
            FieldExpression::Alternatives(children) => children.iter().any(|child| self.matches_expr(child, value)),
            FieldExpression::NoConstraint => true,
        }
    }

    /// `from-to/period`; when `from > to` the range wraps through `max` back to `min`.
    fn in_range(&self, value: i32, from: i32, to: i32, period: u32) -> bool {
        let offset = if from <= to {
            if value < from || value > to {
                return false;
            }
            value - from
        } else if value >= from && value <= self.max {
            value - from
        } else if value >= self.min && value <= to {
            (self.max - from + 1) + (value - self.min)
        } else {
            return false;
        };
        steps_onto(offset, period)
    }
}

fn steps_onto(offset: i32, period: u32) -> bool {
    i64::from(offset) % i64::from(period) == 0
}

/// Day-of-month and day-of-week predicates plus the rule that combines them.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DayMatcher<'a> {
    day_of_month: Option<FieldMatcher<'a>>,
    day_of_week: Option<(FieldMatcher<'a>, WeekdayNumbering)>,
}

impl<'a> DayMatcher<'a> {
    pub fn new(day_of_month: Option<FieldMatcher<'a>>, day_of_week: Option<(FieldMatcher<'a>, WeekdayNumbering)>) -> Self {
        DayMatcher { day_of_month, day_of_week }
    }

    /// Whether `date` satisfies the day fields.
    ///
    /// When both fields restrict the date, matching either is enough. When
    /// exactly one restricts it, that one alone decides; the other field is
    /// ignored even if it carries a step like `*/7`. When neither restricts
    /// it, both must hold, so `*/n` alone still thins out the days.
    pub fn matches(&self, date: NaiveDate) -> bool {
        let dom = self.day_of_month.map(|m| (m.is_restrictive(), matches_day_of_month(&m, m.expression, date)));
        let dow = self
            .day_of_week
            .map(|(m, numbering)| (m.is_restrictive(), matches_day_of_week(&m, m.expression, numbering, date)));

        match (dom, dow) {
            (Some((true, dom_hit)), Some((true, dow_hit))) => dom_hit || dow_hit,
            (Some((true, dom_hit)), _) => dom_hit,
            (_, Some((true, dow_hit))) => dow_hit,
            (dom, dow) => dom.is_none_or(|(_, hit)| hit) && dow.is_none_or(|(_, hit)| hit),
        }
    }
}

fn matches_day_of_month(matcher: &FieldMatcher<'_>, expression: &FieldExpression, date: NaiveDate) -> bool {
    match expression {
        FieldExpression::On(FieldValue::Last) => date.day() == last_day_of_month(date),
        FieldExpression::On(FieldValue::LastWeekday) => date.day() == last_weekday_of_month(date),
        FieldExpression::On(FieldValue::NearestWeekday(day)) => {
            nearest_weekday(date.year(), date.month(), *day) == Some(date.day())
        }
        FieldExpression::Alternatives(children) => {
            children.iter().any(|child| matches_day_of_month(matcher, child, date))
        }
        other => matcher.matches_expr(other, date.day() as i32),
    }
}

fn matches_day_of_week(
    matcher: &FieldMatcher<'_>,
    expression: &FieldExpression,
    numbering: WeekdayNumbering,
    date: NaiveDate,
) -> bool {
    let weekday = date.weekday();
    // Values outside the field's bounds (kept by lenient dialects) name no day.
    let named = |value: i32| (matcher.min..=matcher.max).contains(&value) && numbering.weekday(value) == Some(weekday);
    match expression {
        FieldExpression::On(FieldValue::Int(value)) => named(*value),
        FieldExpression::On(FieldValue::NthOccurrence(value, nth)) => named(*value) && weekday_occurrence(date) == *nth,
        FieldExpression::Alternatives(children) => {
            children.iter().any(|child| matches_day_of_week(matcher, child, numbering, date))
        }
        other => native_values(numbering, weekday, matcher.max).any(|v| matcher.matches_expr(other, v)),
    }
}

/// Native encodings of `weekday`; Sunday is both 0 and 7 when the field reaches 7.
fn native_values(numbering: WeekdayNumbering, weekday: Weekday, max: i32) -> impl Iterator<Item = i32> {
    let native = numbering.native(weekday);
    let alias = (numbering == WeekdayNumbering::SundayZero && weekday == Weekday::Sun && max >= 7).then_some(7);
    std::iter::once(native).chain(alias)
}
