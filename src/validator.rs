//! Semantic checks on parsed or hand-built expression trees.
//!
//! Every failure here is a [`CronError::Validation`]; syntax problems are the
//! parser's business.

use std::collections::BTreeMap;

use crate::constraints::FieldConstraints;
use crate::definition::CronDefinition;
use crate::error::CronResult;
use crate::expression::FieldExpression;
use crate::field::{FieldName, FieldValue, SpecialChars};

/// Highest `#n` occurrence a month can hold.
const MAX_NTH_OCCURRENCE: u32 = 5;

/// Check one field's tree against its constraints.
pub fn validate_field(
    name: FieldName,
    expression: &FieldExpression,
    constraints: &FieldConstraints,
    strict: bool,
) -> CronResult<()> {
    let check = FieldCheck { name, constraints, strict };
    check.expression(expression, false)
}

/// Check a whole cron: field set, every field, and the day-field pairing rules.
pub fn validate_cron(definition: &CronDefinition, fields: &BTreeMap<FieldName, FieldExpression>) -> CronResult<()> {
    if let Some(extra) = fields.keys().find(|name| !definition.contains(**name)) {
        return Err(validation_err!(*extra, "field is not part of this dialect"));
    }

    let last = definition.max_arity().saturating_sub(1);
    for (idx, field) in definition.fields().iter().enumerate() {
        match fields.get(&field.name()) {
            Some(expression) => {
                let strict = definition.is_strict_for(field.constraints());
                validate_field(field.name(), expression, field.constraints(), strict)?;
            }
            None if definition.is_last_field_optional() && idx == last => {}
            None => return Err(validation_err!(field.name(), "required field is missing")),
        }
    }

    let dom = fields.get(&FieldName::DayOfMonth).map(|e| matches!(e, FieldExpression::NoConstraint));
    let dow = fields.get(&FieldName::DayOfWeek).map(|e| matches!(e, FieldExpression::NoConstraint));
    if let (Some(dom_unset), Some(dow_unset)) = (dom, dow) {
        if dom_unset && dow_unset {
            return Err(validation_err!(FieldName::DayOfWeek, "'?' cannot be used for both day-of-month and day-of-week"));
        }
        if definition.requires_question_mark() && !dom_unset && !dow_unset {
            return Err(validation_err!(
                FieldName::DayOfWeek,
                "one of day-of-month and day-of-week must be '?'"
            ));
        }
    }
    Ok(())
}

struct FieldCheck<'a> {
    name: FieldName,
    constraints: &'a FieldConstraints,
    strict: bool,
}

impl FieldCheck<'_> {
    fn expression(&self, expression: &FieldExpression, in_list: bool) -> CronResult<()> {
        match expression {
            FieldExpression::Always { period } => self.period(*period, self.constraints.max() - self.constraints.min()),
            FieldExpression::On(value) => self.value(*value),
            FieldExpression::Between { from, to, period } => self.between(*from, *to, *period),
            FieldExpression::Alternatives(children) => {
                if children.is_empty() {
                    return Err(validation_err!(self.name, "empty list of values"));
                }
                children.iter().try_for_each(|child| self.expression(child, true))
            }
            FieldExpression::NoConstraint if in_list => {
                Err(validation_err!(self.name, "'?' cannot be combined with other values"))
            }
            FieldExpression::NoConstraint => {
                if self.name.is_day_field() && self.constraints.allows(SpecialChars::QUESTION_MARK) {
                    Ok(())
                } else {
                    Err(validation_err!(self.name, "'?' is not supported here"))
                }
            }
        }
    }

    fn value(&self, value: FieldValue) -> CronResult<()> {
        let special = value.special();
        let legal_field = match value {
            FieldValue::Int(_) => true,
            FieldValue::Last | FieldValue::LastWeekday | FieldValue::NearestWeekday(_) => {
                self.name == FieldName::DayOfMonth
            }
            FieldValue::NthOccurrence(..) => self.name == FieldName::DayOfWeek,
        };
        if !legal_field || !self.constraints.allows(special.flag()) {
            return Err(validation_err!(self.name, "'{value}' is not supported here"));
        }
        if let FieldValue::NthOccurrence(_, nth) = value {
            if !(1..=MAX_NTH_OCCURRENCE).contains(&nth) {
                return Err(validation_err!(self.name, "occurrence #{nth} must be between 1 and {MAX_NTH_OCCURRENCE}"));
            }
        }
        match value.number() {
            Some(number) => self.bounds(number),
            None => Ok(()),
        }
    }

    fn between(&self, from: i32, to: i32, period: u32) -> CronResult<()> {
        self.bounds(from)?;
        self.bounds(to)?;
        if self.strict && from > to {
            return Err(validation_err!(self.name, "range start {from} is above range end {to}"));
        }
        if from <= to { self.period(period, to - from) } else { self.period(period, i32::MAX) }
    }

    fn period(&self, period: u32, span: i32) -> CronResult<()> {
        if period == 0 {
            return Err(validation_err!(self.name, "step must be positive"));
        }
        if i32::try_from(period).is_err() {
            return Err(validation_err!(self.name, "step {period} is too large"));
        }
        if self.strict && i64::from(period) > i64::from(span.max(1)) {
            return Err(validation_err!(self.name, "step {period} exceeds the range span {span}"));
        }
        Ok(())
    }

    fn bounds(&self, value: i32) -> CronResult<()> {
        if self.strict && !self.constraints.in_range(value) {
            return Err(validation_err!(
                self.name,
                "value {value} is outside {}-{}",
                self.constraints.min(),
                self.constraints.max()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::FieldConstraintsBuilder;
    use crate::expression::{always, and, between, between_every, every, on, on_special, question_mark};

    fn constraints(name: FieldName, specials: SpecialChars) -> FieldConstraints {
        FieldConstraintsBuilder::for_field(name).with_special_chars(specials).build()
    }

    #[test]
    fn strict_mode_rejects_out_of_range_values() {
        let minute = constraints(FieldName::Minute, SpecialChars::empty());
        let err = validate_field(FieldName::Minute, &on(60), &minute, true).unwrap_err();
        assert!(err.is_validation());
        assert!(validate_field(FieldName::Minute, &on(60), &minute, false).is_ok());
    }

    #[test]
    fn strict_mode_rejects_reversed_ranges() {
        let hour = constraints(FieldName::Hour, SpecialChars::empty());
        assert!(validate_field(FieldName::Hour, &between(22, 2), &hour, true).is_err());
        assert!(validate_field(FieldName::Hour, &between(5, 5), &hour, true).is_ok());
        assert!(validate_field(FieldName::Hour, &between(22, 2), &hour, false).is_ok());
    }

    #[test]
    fn strict_mode_rejects_step_wider_than_range() {
        let minute = constraints(FieldName::Minute, SpecialChars::empty());
        assert!(validate_field(FieldName::Minute, &between_every(0, 10, 20), &minute, true).is_err());
        assert!(validate_field(FieldName::Minute, &between_every(0, 10, 20), &minute, false).is_ok());
        assert!(validate_field(FieldName::Minute, &between_every(0, 30, 30), &minute, true).is_ok());
        assert!(validate_field(FieldName::Minute, &every(60), &minute, true).is_err());
        assert!(validate_field(FieldName::Minute, &every(60), &minute, false).is_ok());
        assert!(validate_field(FieldName::Minute, &every(0), &minute, false).is_err());
    }

    #[test]
    fn step_beyond_i32_is_rejected_even_when_lenient() {
        let minute = constraints(FieldName::Minute, SpecialChars::empty());
        assert!(validate_field(FieldName::Minute, &every(u32::MAX), &minute, false).is_err());
        assert!(validate_field(FieldName::Minute, &between_every(0, 5, 1 << 31), &minute, false).is_err());
    }

    #[test]
    fn special_characters_are_field_specific() {
        let dom = constraints(FieldName::DayOfMonth, SpecialChars::all());
        let dow = constraints(FieldName::DayOfWeek, SpecialChars::all());
        assert!(validate_field(FieldName::DayOfMonth, &on_special(FieldValue::Last), &dom, true).is_ok());
        assert!(validate_field(FieldName::DayOfMonth, &on_special(FieldValue::NearestWeekday(15)), &dom, true).is_ok());
        assert!(validate_field(FieldName::DayOfWeek, &on_special(FieldValue::Last), &dow, true).is_err());
        assert!(validate_field(FieldName::DayOfWeek, &on_special(FieldValue::NthOccurrence(5, 3)), &dow, true).is_ok());
        assert!(validate_field(FieldName::DayOfMonth, &on_special(FieldValue::NthOccurrence(5, 3)), &dom, true).is_err());
    }

    #[test]
    fn special_characters_need_the_dialect_flag() {
        let dom = constraints(FieldName::DayOfMonth, SpecialChars::LAST);
        assert!(validate_field(FieldName::DayOfMonth, &on_special(FieldValue::Last), &dom, true).is_ok());
        assert!(validate_field(FieldName::DayOfMonth, &on_special(FieldValue::LastWeekday), &dom, true).is_err());
        assert!(validate_field(FieldName::DayOfMonth, &question_mark(), &dom, true).is_err());
    }

    #[test]
    fn nth_occurrence_is_bounded() {
        let dow = constraints(FieldName::DayOfWeek, SpecialChars::NTH);
        assert!(validate_field(FieldName::DayOfWeek, &on_special(FieldValue::NthOccurrence(1, 6)), &dow, false).is_err());
        assert!(validate_field(FieldName::DayOfWeek, &on_special(FieldValue::NthOccurrence(1, 0)), &dow, false).is_err());
    }

    #[test]
    fn question_mark_cannot_share_a_list() {
        let dom = constraints(FieldName::DayOfMonth, SpecialChars::QUESTION_MARK);
        let err = validate_field(FieldName::DayOfMonth, &and([on(1), question_mark()]), &dom, true).unwrap_err();
        assert!(err.to_string().contains("cannot be combined"));
    }

    #[test]
    fn question_mark_outside_day_fields_is_rejected() {
        let hour = constraints(FieldName::Hour, SpecialChars::empty());
        assert!(validate_field(FieldName::Hour, &question_mark(), &hour, false).is_err());
        assert!(validate_field(FieldName::Hour, &always(), &hour, true).is_ok());
    }
}
