//! Per-field constraints: numeric range, symbolic names, integer aliases and
//! the special characters a field accepts.

use std::collections::BTreeMap;

use chrono::Weekday;

use crate::field::{FieldName, SpecialChars};

const MONTH_NAMES: [&str; 12] = ["JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC"];
const DAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// How a dialect numbers the days of the week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeekdayNumbering {
    /// `0 = SUN .. 6 = SAT` (Unix, Cron4j, Spring). `7` also reads as Sunday.
    #[default]
    SundayZero,
    /// `1 = SUN .. 7 = SAT` (Quartz).
    SundayOne,
}

impl WeekdayNumbering {
    /// Translate a native day-of-week value into the canonical weekday.
    pub fn weekday(self, value: i32) -> Option<Weekday> {
        let from_sunday = match self {
            WeekdayNumbering::SundayZero if (0..=7).contains(&value) => value % 7,
            WeekdayNumbering::SundayOne if (1..=7).contains(&value) => value - 1,
            _ => return None,
        };
        Some(match from_sunday {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            _ => Weekday::Sat,
        })
    }

    /// Native value for `weekday`.
    pub fn native(self, weekday: Weekday) -> i32 {
        let from_sunday = weekday.num_days_from_sunday() as i32;
        match self {
            WeekdayNumbering::SundayZero => from_sunday,
            WeekdayNumbering::SundayOne => from_sunday + 1,
        }
    }

    fn first_value(self) -> i32 {
        match self {
            WeekdayNumbering::SundayZero => 0,
            WeekdayNumbering::SundayOne => 1,
        }
    }
}

/// Constraints for one field of a dialect. Shared read-only by every parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConstraints {
    names: BTreeMap<String, i32>,
    int_mapping: BTreeMap<i32, i32>,
    specials: SpecialChars,
    min: i32,
    max: i32,
    strict_range: bool,
    weekday_numbering: Option<WeekdayNumbering>,
}

impl FieldConstraints {
    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn specials(&self) -> SpecialChars {
        self.specials
    }

    pub fn allows(&self, special: SpecialChars) -> bool {
        self.specials.contains(special)
    }

    pub fn is_strict_range(&self) -> bool {
        self.strict_range
    }

    pub fn weekday_numbering(&self) -> Option<WeekdayNumbering> {
        self.weekday_numbering
    }

    pub fn in_range(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Look up an upper-case symbolic name.
    pub fn resolve_name(&self, name: &str) -> Option<i32> {
        self.names.get(name).copied()
    }

    pub fn has_names(&self) -> bool {
        !self.names.is_empty()
    }

    /// Apply the dialect's integer alias table to a single value.
    pub fn remap(&self, value: i32) -> i32 {
        self.int_mapping.get(&value).copied().unwrap_or(value)
    }
}

/// Fluent builder for [`FieldConstraints`], preloaded with the field's usual
/// range and names.
#[derive(Debug, Clone)]
pub struct FieldConstraintsBuilder {
    constraints: FieldConstraints,
}

impl FieldConstraintsBuilder {
    pub fn for_field(field: FieldName) -> Self {
        let (min, max) = match field {
            FieldName::Second | FieldName::Minute => (0, 59),
            FieldName::Hour => (0, 23),
            FieldName::DayOfMonth => (1, 31),
            FieldName::Month => (1, 12),
            FieldName::DayOfWeek => (0, 6),
            FieldName::Year => (1970, 2099),
        };
        let names: BTreeMap<String, i32> = match field {
            FieldName::Month => MONTH_NAMES.iter().zip(1..).map(|(name, v)| (name.to_string(), v)).collect(),
            FieldName::DayOfWeek => day_names(WeekdayNumbering::SundayZero),
            _ => BTreeMap::new(),
        };
        let weekday_numbering = (field == FieldName::DayOfWeek).then_some(WeekdayNumbering::SundayZero);

        FieldConstraintsBuilder {
            constraints: FieldConstraints {
                names,
                int_mapping: BTreeMap::new(),
                specials: SpecialChars::empty(),
                min,
                max,
                strict_range: false,
                weekday_numbering,
            },
        }
    }

    pub fn with_valid_range(mut self, min: i32, max: i32) -> Self {
        self.constraints.min = min;
        self.constraints.max = max;
        self
    }

    /// Renumber day-of-week values and names.
    pub fn with_weekday_numbering(mut self, numbering: WeekdayNumbering) -> Self {
        self.constraints.weekday_numbering = Some(numbering);
        self.constraints.names = day_names(numbering);
        self
    }

    pub fn with_name(mut self, name: &str, value: i32) -> Self {
        self.constraints.names.insert(name.to_ascii_uppercase(), value);
        self
    }

    pub fn with_int_mapping(mut self, from: i32, to: i32) -> Self {
        self.constraints.int_mapping.insert(from, to);
        self
    }

    pub fn with_special_chars(mut self, specials: SpecialChars) -> Self {
        self.constraints.specials |= specials;
        self
    }

    pub fn with_strict_range(mut self) -> Self {
        self.constraints.strict_range = true;
        self
    }

    pub fn build(self) -> FieldConstraints {
        self.constraints
    }
}

fn day_names(numbering: WeekdayNumbering) -> BTreeMap<String, i32> {
    DAY_NAMES.iter().zip(numbering.first_value()..).map(|(name, v)| (name.to_string(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_resolve_to_numbers() {
        let month = FieldConstraintsBuilder::for_field(FieldName::Month).build();
        assert_eq!(month.resolve_name("JAN"), Some(1));
        assert_eq!(month.resolve_name("DEC"), Some(12));
        assert_eq!(month.resolve_name("FOO"), None);
    }

    #[test]
    fn quartz_numbering_shifts_day_names() {
        let dow = FieldConstraintsBuilder::for_field(FieldName::DayOfWeek)
            .with_weekday_numbering(WeekdayNumbering::SundayOne)
            .with_valid_range(1, 7)
            .build();
        assert_eq!(dow.resolve_name("SUN"), Some(1));
        assert_eq!(dow.resolve_name("SAT"), Some(7));
        assert_eq!(WeekdayNumbering::SundayOne.weekday(2), Some(Weekday::Mon));
        assert_eq!(WeekdayNumbering::SundayOne.native(Weekday::Sat), 7);
    }

    #[test]
    fn sunday_zero_reads_seven_as_sunday() {
        assert_eq!(WeekdayNumbering::SundayZero.weekday(7), Some(Weekday::Sun));
        assert_eq!(WeekdayNumbering::SundayZero.weekday(0), Some(Weekday::Sun));
        assert_eq!(WeekdayNumbering::SundayZero.weekday(8), None);
    }

    #[test]
    fn int_mapping_only_touches_listed_values() {
        let dow = FieldConstraintsBuilder::for_field(FieldName::DayOfWeek)
            .with_valid_range(0, 7)
            .with_int_mapping(7, 0)
            .build();
        assert_eq!(dow.remap(7), 0);
        assert_eq!(dow.remap(3), 3);
        assert!(dow.in_range(7));
    }
}
